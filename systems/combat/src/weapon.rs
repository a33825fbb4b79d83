//! Weapons wielded by entities and their usage counters.

use transience_core::{
    AttackEffect, EntityId, WeaponKind, DEFAULT_MELEE_RANGE, DEFAULT_RANGED_RANGE,
};

/// Damage dealt by a freshly forged weapon.
const DEFAULT_DAMAGE: i32 = 1;

/// Weapon wielded by a single entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weapon {
    kind: WeaponKind,
    owner: Option<EntityId>,
    damage_output: i32,
    swing_range: f32,
    range: f32,
    effect: AttackEffect,
    times_used: i32,
}

impl Weapon {
    /// Single-target melee weapon that strikes for one point of damage.
    #[must_use]
    pub const fn melee(owner: Option<EntityId>) -> Self {
        Self::forge(WeaponKind::Melee, owner, DEFAULT_MELEE_RANGE, AttackEffect::Strike)
    }

    /// Single-target ranged weapon. The projectile carries the damage, so the
    /// default hook is inert.
    #[must_use]
    pub const fn ranged(owner: Option<EntityId>) -> Self {
        Self::forge(WeaponKind::Ranged, owner, DEFAULT_RANGED_RANGE, AttackEffect::Inert)
    }

    const fn forge(
        kind: WeaponKind,
        owner: Option<EntityId>,
        range: f32,
        effect: AttackEffect,
    ) -> Self {
        Self {
            kind,
            owner,
            damage_output: DEFAULT_DAMAGE,
            swing_range: 0.0,
            range,
            effect,
            times_used: 0,
        }
    }

    /// Overrides the damage dealt per hit.
    #[must_use]
    pub const fn with_damage(mut self, damage_output: i32) -> Self {
        self.damage_output = damage_output;
        self
    }

    /// Turns the weapon into an area weapon when `swing_range` is positive.
    #[must_use]
    pub const fn with_swing_range(mut self, swing_range: f32) -> Self {
        self.swing_range = swing_range;
        self
    }

    /// Overrides the nominal reach.
    ///
    /// Targeting uses the fixed single-target range instead, so this value is
    /// informational.
    #[must_use]
    pub const fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    /// Replaces the hook fired when an attack connects.
    #[must_use]
    pub const fn with_effect(mut self, effect: AttackEffect) -> Self {
        self.effect = effect;
        self
    }

    /// Weapon family.
    #[must_use]
    pub const fn kind(&self) -> WeaponKind {
        self.kind
    }

    /// Entity wielding the weapon.
    #[must_use]
    pub const fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Hands the weapon to another wielder.
    pub fn set_owner(&mut self, owner: Option<EntityId>) {
        self.owner = owner;
    }

    /// Damage dealt per hit.
    #[must_use]
    pub const fn damage_output(&self) -> i32 {
        self.damage_output
    }

    /// Radius of the area attack; zero for single-target weapons.
    #[must_use]
    pub const fn swing_range(&self) -> f32 {
        self.swing_range
    }

    /// Nominal reach.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.range
    }

    /// Hook fired when an attack connects.
    #[must_use]
    pub const fn effect(&self) -> AttackEffect {
        self.effect
    }

    /// Net number of uses; wasted uses are refunded.
    #[must_use]
    pub const fn times_used(&self) -> i32 {
        self.times_used
    }

    /// Reports whether the weapon hits every target within its swing range.
    #[must_use]
    pub fn is_swing_weapon(&self) -> bool {
        self.swing_range > 0.0
    }

    pub(crate) fn record_use(&mut self) {
        self.times_used = self.times_used.saturating_add(1);
    }

    pub(crate) fn refund_use(&mut self) -> i32 {
        self.times_used = self.times_used.saturating_sub(1);
        self.times_used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_weapon_family() {
        let sword = Weapon::melee(None);
        assert_eq!(sword.damage_output(), 1);
        assert_eq!(sword.effect(), AttackEffect::Strike);
        assert_eq!(sword.range(), DEFAULT_MELEE_RANGE);
        assert!(!sword.is_swing_weapon());

        let bow = Weapon::ranged(Some(EntityId::new(3)));
        assert_eq!(bow.effect(), AttackEffect::Inert);
        assert_eq!(bow.range(), DEFAULT_RANGED_RANGE);
        assert_eq!(bow.owner(), Some(EntityId::new(3)));
    }

    #[test]
    fn positive_swing_range_marks_area_weapon() {
        assert!(Weapon::melee(None).with_swing_range(2.0).is_swing_weapon());
        assert!(!Weapon::melee(None).with_swing_range(-1.0).is_swing_weapon());
    }

    #[test]
    fn refunds_may_go_negative() {
        let mut sword = Weapon::melee(None);
        sword.record_use();
        assert_eq!(sword.refund_use(), 0);
        assert_eq!(sword.refund_use(), -1);
        assert_eq!(sword.times_used(), -1);
    }
}
