//! Unit stacks - a group of identical creatures fighting as one

use serde::{Deserialize, Serialize};

use crate::units::template::UnitTemplate;

/// Stat a buff can modify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Attack,
    Defense,
    Speed,
}

/// Non-numeric effect carried by a buff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusEffect {
    /// Damage rolls always use the maximum
    MaxDamage,
    /// Damage rolls always use the minimum
    MinDamage,
    /// Stack skips its turns
    Blind,
}

/// Timed modifier on a stack
///
/// `delta` is what was actually added to the stat, which may be smaller
/// than the spell's nominal amount when a penalty was clamped at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buff {
    pub spell_id: String,
    pub stat: Option<Stat>,
    pub delta: i32,
    pub rounds_left: u32,
    pub effect: Option<StatusEffect>,
}

/// A group of identical creatures
///
/// Damage is absorbed by the top creature first (`current_hp`), then by
/// whole creatures. A stack with `count == 0` is dead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitStack {
    pub template_id: String,
    pub name: String,
    pub tier: u8,
    pub count: u32,
    /// Hit points per creature
    pub hp: u32,
    /// Remaining hit points of the top creature
    pub current_hp: u32,
    pub attack: i32,
    pub defense: i32,
    pub min_damage: u32,
    pub max_damage: u32,
    pub speed: i32,
    pub ranged: bool,
    pub flying: bool,
    pub no_retaliation: bool,
    pub unlimited_retaliation: bool,
    pub shots_left: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffs: Vec<Buff>,
}

impl UnitStack {
    pub fn from_template(template: &UnitTemplate, count: u32) -> Self {
        Self {
            template_id: template.id.clone(),
            name: template.name.clone(),
            tier: template.tier,
            count,
            hp: template.hp,
            current_hp: if count > 0 { template.hp } else { 0 },
            attack: template.attack,
            defense: template.defense,
            min_damage: template.min_damage,
            max_damage: template.max_damage,
            speed: template.speed,
            ranged: template.ranged,
            flying: template.flying,
            no_retaliation: template.no_retaliation,
            unlimited_retaliation: template.unlimited_retaliation,
            shots_left: template.shots,
            buffs: Vec::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.count > 0
    }

    /// Hit points left across the whole stack
    pub fn total_hp(&self) -> u64 {
        if self.count == 0 {
            return 0;
        }
        (self.count as u64 - 1) * self.hp as u64 + self.current_hp as u64
    }

    /// Cells the stack may cover in one move (doubled for flyers)
    pub fn movement_budget(&self) -> i32 {
        let speed = self.speed.max(0);
        if self.flying {
            speed * 2
        } else {
            speed
        }
    }

    /// Stack after taking `amount` damage; `self` is left untouched
    pub fn apply_damage(&self, amount: u32) -> UnitStack {
        let mut next = self.clone();
        if next.count == 0 || amount == 0 || next.hp == 0 {
            return next;
        }

        if amount < next.current_hp {
            next.current_hp -= amount;
            return next;
        }

        // Top creature dies, the rest carries down through whole creatures
        let remainder = amount - next.current_hp;
        next.count -= 1;
        next.current_hp = next.hp;

        if remainder > 0 && next.count > 0 {
            let kills = remainder / next.hp;
            let leftover = remainder % next.hp;
            next.count = next.count.saturating_sub(kills);
            if next.count > 0 && leftover > 0 {
                next.current_hp = next.hp - leftover;
            }
        }

        if next.count == 0 {
            next.current_hp = 0;
        }
        next
    }

    /// Stack after healing the top creature, capped at full health
    pub fn healed(&self, amount: u32) -> UnitStack {
        let mut next = self.clone();
        if next.count > 0 {
            next.current_hp = next.hp.min(next.current_hp.saturating_add(amount));
        }
        next
    }

    /// Stack after restoring `amount` hit points, raising dead creatures
    /// but never beyond `max_count`
    pub fn revived(&self, amount: u32, max_count: u32) -> UnitStack {
        let mut next = self.clone();
        if next.hp == 0 {
            return next;
        }
        let hp = next.hp as u64;
        let ceiling = max_count.max(next.count) as u64 * hp;
        let restored = (self.total_hp() + amount as u64).min(ceiling);
        if restored == 0 {
            return next;
        }
        let count = restored.div_ceil(hp);
        next.count = count as u32;
        next.current_hp = (restored - (count - 1) * hp) as u32;
        next
    }

    pub fn stat(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::Speed => self.speed,
        }
    }

    /// Add `delta` to a stat without letting it drop below zero;
    /// returns the change actually applied
    pub fn adjust_stat(&mut self, stat: Stat, delta: i32) -> i32 {
        let slot = match stat {
            Stat::Attack => &mut self.attack,
            Stat::Defense => &mut self.defense,
            Stat::Speed => &mut self.speed,
        };
        let applied = if delta < 0 { delta.max(-(*slot).max(0)) } else { delta };
        *slot += applied;
        applied
    }

    pub fn has_effect(&self, effect: StatusEffect) -> bool {
        self.buffs.iter().any(|b| b.effect == Some(effect))
    }

    /// Apply a buff; an existing buff from the same spell is replaced
    pub fn add_buff(
        &mut self,
        spell_id: &str,
        stat: Option<Stat>,
        amount: i32,
        rounds: u32,
        effect: Option<StatusEffect>,
    ) -> i32 {
        if let Some(index) = self.buffs.iter().position(|b| b.spell_id == spell_id) {
            let old = self.buffs.remove(index);
            self.revert(&old);
        }
        let delta = match stat {
            Some(stat) => self.adjust_stat(stat, amount),
            None => 0,
        };
        self.buffs.push(Buff {
            spell_id: spell_id.to_string(),
            stat,
            delta,
            rounds_left: rounds,
            effect,
        });
        delta
    }

    /// Count one round off every buff, reverting and returning the expired ones
    ///
    /// A buff lasts the rest of the round it was cast in plus
    /// `rounds_left` full rounds.
    pub fn tick_buffs(&mut self) -> Vec<Buff> {
        let mut expired = Vec::new();
        let mut kept = Vec::with_capacity(self.buffs.len());
        for mut buff in std::mem::take(&mut self.buffs) {
            if buff.rounds_left == 0 {
                expired.push(buff);
            } else {
                buff.rounds_left -= 1;
                kept.push(buff);
            }
        }
        self.buffs = kept;
        for buff in &expired {
            self.revert(buff);
        }
        expired
    }

    /// Drop every buff, restoring the stats they changed
    pub fn clear_buffs(&mut self) {
        for buff in std::mem::take(&mut self.buffs) {
            self.revert(&buff);
        }
    }

    fn revert(&mut self, buff: &Buff) {
        if let Some(stat) = buff.stat {
            match stat {
                Stat::Attack => self.attack -= buff.delta,
                Stat::Defense => self.defense -= buff.delta,
                Stat::Speed => self.speed -= buff.delta,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitRegistry;

    fn peasants(count: u32) -> UnitStack {
        UnitRegistry::standard()
            .create_stack("PEASANT", count)
            .expect("peasant template")
    }

    #[test]
    fn test_damage_spills_into_whole_creatures() {
        // 3 HP each: 7 damage kills two and leaves 2 HP on the third
        let stack = peasants(5);
        let hit = stack.apply_damage(7);
        assert_eq!(hit.count, 3);
        assert_eq!(hit.current_hp, 2);
        // Input untouched
        assert_eq!(stack.count, 5);
        assert_eq!(stack.total_hp() - hit.total_hp(), 7);
    }

    #[test]
    fn test_damage_below_top_creature_hp() {
        let stack = peasants(2).apply_damage(2);
        assert_eq!(stack.count, 2);
        assert_eq!(stack.current_hp, 1);
    }

    #[test]
    fn test_exact_kill_leaves_full_top_creature() {
        let stack = peasants(4).apply_damage(6);
        assert_eq!(stack.count, 2);
        assert_eq!(stack.current_hp, 3);
    }

    #[test]
    fn test_overkill_clamps_at_zero() {
        let stack = peasants(3).apply_damage(1000);
        assert_eq!(stack.count, 0);
        assert_eq!(stack.current_hp, 0);
        assert_eq!(stack.total_hp(), 0);
        assert!(!stack.is_alive());
    }

    #[test]
    fn test_heal_caps_at_creature_hp() {
        let stack = peasants(3).apply_damage(2).healed(50);
        assert_eq!(stack.count, 3);
        assert_eq!(stack.current_hp, 3);
    }

    #[test]
    fn test_revive_never_exceeds_starting_count() {
        let wounded = peasants(5).apply_damage(10);
        assert_eq!(wounded.count, 2);

        let partial = wounded.revived(4, 5);
        assert_eq!(partial.total_hp(), wounded.total_hp() + 4);

        let full = wounded.revived(1000, 5);
        assert_eq!(full.count, 5);
        assert_eq!(full.current_hp, 3);

        let dead = peasants(2).apply_damage(100);
        let raised = dead.revived(4, 2);
        assert_eq!(raised.count, 2);
        assert_eq!(raised.current_hp, 1);
    }

    #[test]
    fn test_buff_expiry_restores_stat() {
        let mut stack = peasants(5);
        let before = stack.speed;
        stack.add_buff("BLIND", Some(Stat::Speed), -999, 1, Some(StatusEffect::Blind));
        assert_eq!(stack.speed, 0);
        assert!(stack.has_effect(StatusEffect::Blind));

        // Still blind for the whole next round
        assert!(stack.tick_buffs().is_empty());
        assert_eq!(stack.speed, 0);

        let expired = stack.tick_buffs();
        assert_eq!(expired.len(), 1);
        assert_eq!(stack.speed, before);
        assert!(stack.buffs.is_empty());
    }

    #[test]
    fn test_recasting_buff_replaces_it() {
        let mut stack = peasants(5);
        stack.add_buff("HASTE", Some(Stat::Speed), 3, 3, None);
        stack.add_buff("HASTE", Some(Stat::Speed), 3, 3, None);
        assert_eq!(stack.speed, 6);
        assert_eq!(stack.buffs.len(), 1);

        stack.clear_buffs();
        assert_eq!(stack.speed, 3);
    }
}
