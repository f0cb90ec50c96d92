//! Per-combatant effect bookkeeping and the rules that govern it.
//!
//! An [`EffectTrack`] owns the temporary effects and permanent auras of one
//! combatant. Every mutation goes through the rule checks in a fixed order:
//!
//! ```text
//! apply:  resolve → immunity → resistance → stack | refresh | add → combo
//! tick:   accumulate DoT/HoT (× stacks) → decrement → expire
//! strip:  filter by category & removability → order by cleanse priority → take N
//! ```
//!
//! The track never sees hit points. Damage and healing from ticks and combos
//! are reported back to the caller, which owns the combatant.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::env::EffectCatalog;

use super::active::{ActiveEffect, Aura};
use super::error::{ApplyRejection, RemovalError};
use super::modifiers::AggregatedModifiers;
use super::template::{EffectCategory, EffectFlags, EffectId, EffectPayload, EffectTemplate};

/// What a successful [`EffectTrack::apply`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ApplyAction {
    Added,
    Stacked,
    Refreshed,
}

/// Per-application overrides of template defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyOverrides {
    /// Replaces the template duration (minimum 1 turn).
    pub duration: Option<u32>,
    /// Attribution label stored on the instance.
    pub source: Option<String>,
}

impl ApplyOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_duration(mut self, turns: u32) -> Self {
        self.duration = Some(turns);
        self
    }
}

/// A combo that fired as part of an application.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComboTrigger {
    pub rule: String,
    /// Inputs removed before the result was applied.
    pub consumed: Vec<EffectId>,
    pub result: EffectId,
    /// Damage the owner of the track should take.
    pub bonus_damage: u32,
    /// Outcome of applying the result; it passes the same immunity and
    /// resistance checks as any other application.
    pub applied: Result<ApplyAction, ApplyRejection>,
}

/// Successful application report.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApplyOutcome {
    pub effect: EffectId,
    pub action: ApplyAction,
    /// Stack count after the application.
    pub stacks: u8,
    pub combo: Option<ComboTrigger>,
}

/// Input for [`EffectTrack::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickContext {
    /// Maximum health of the owner, for percentage heals.
    pub max_hp: u32,
}

/// Contribution of a single effect or aura during a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickEntry {
    pub id: EffectId,
    pub stacks: u8,
    pub damage: u32,
    pub heal: u32,
}

/// Result of one tick over the whole track.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickReport {
    pub total_damage: u32,
    pub total_heal: u32,
    /// Contributions in insertion order (effects first, then auras).
    pub per_effect: Vec<TickEntry>,
    pub expired: Vec<EffectId>,
}

/// Selection for cleanse and dispel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CleanseOptions {
    pub count: usize,
    /// Defaults to `debuff` for cleanse and `buff` for dispel.
    pub category: Option<EffectCategory>,
    /// Remove exactly this effect instead of selecting by priority.
    pub specific: Option<EffectId>,
}

impl CleanseOptions {
    pub fn count(count: usize) -> Self {
        Self {
            count,
            category: None,
            specific: None,
        }
    }

    pub fn specific(id: impl Into<EffectId>) -> Self {
        Self {
            count: 1,
            category: None,
            specific: Some(id.into()),
        }
    }

    #[must_use]
    pub fn in_category(mut self, category: EffectCategory) -> Self {
        self.category = Some(category);
        self
    }
}

/// Events that break fragile effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakTrigger {
    /// The owner took direct damage.
    Damaged,
    /// The owner attacked.
    Attacked,
}

impl BreakTrigger {
    const fn flag(self) -> EffectFlags {
        match self {
            Self::Damaged => EffectFlags::BREAKS_ON_DAMAGE,
            Self::Attacked => EffectFlags::BREAKS_ON_ATTACK,
        }
    }
}

/// Active effects and auras of one combatant.
#[derive(Clone)]
pub struct EffectTrack {
    catalog: Arc<dyn EffectCatalog>,
    /// Templates applied directly rather than through the catalog.
    adhoc: BTreeMap<EffectId, EffectTemplate>,
    effects: Vec<ActiveEffect>,
    auras: Vec<Aura>,
    clock: u64,
}

impl fmt::Debug for EffectTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectTrack")
            .field("effects", &self.effects)
            .field("auras", &self.auras)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

fn lookup<'a>(
    catalog: &'a dyn EffectCatalog,
    adhoc: &'a BTreeMap<EffectId, EffectTemplate>,
    id: &str,
) -> Option<&'a EffectTemplate> {
    catalog.template(id).or_else(|| adhoc.get(id))
}

impl EffectTrack {
    pub fn new(catalog: Arc<dyn EffectCatalog>) -> Self {
        Self {
            catalog,
            adhoc: BTreeMap::new(),
            effects: Vec::new(),
            auras: Vec::new(),
            clock: 0,
        }
    }

    pub fn catalog(&self) -> &Arc<dyn EffectCatalog> {
        &self.catalog
    }

    fn template(&self, id: &str) -> Option<&EffectTemplate> {
        lookup(self.catalog.as_ref(), &self.adhoc, id)
    }

    // ========================================================================
    // Application
    // ========================================================================

    /// Applies a catalog effect by id.
    pub fn apply(
        &mut self,
        id: &str,
        overrides: ApplyOverrides,
    ) -> Result<ApplyOutcome, ApplyRejection> {
        let template = self
            .template(id)
            .cloned()
            .ok_or_else(|| ApplyRejection::UnknownEffect(id.into()))?;
        self.apply_resolved(&template, overrides, true)
    }

    /// Applies an effect from a template that need not be in the catalog.
    ///
    /// Combo and resistance rules are still read from the catalog.
    pub fn apply_template(
        &mut self,
        template: &EffectTemplate,
        overrides: ApplyOverrides,
    ) -> Result<ApplyOutcome, ApplyRejection> {
        if self.catalog.template(template.id.as_str()).is_none() {
            self.adhoc.insert(template.id.clone(), template.clone());
        }
        self.apply_resolved(template, overrides, true)
    }

    fn apply_resolved(
        &mut self,
        template: &EffectTemplate,
        overrides: ApplyOverrides,
        scan_combos: bool,
    ) -> Result<ApplyOutcome, ApplyRejection> {
        self.check_immunity(template)?;
        self.check_resistance(template)?;

        let duration = overrides
            .duration
            .or(template.duration.turns())
            .map(|turns| turns.max(1));
        let limit = template.stack_limit();

        let (action, stacks) = match self.effects.iter_mut().find(|e| e.id == template.id) {
            Some(existing) => {
                if !template.is_removable() {
                    tracing::debug!(effect = %template.id, "existing instance cannot be modified");
                    return Err(ApplyRejection::CannotModify(template.id.clone()));
                }
                existing.remaining = duration;
                if overrides.source.is_some() {
                    existing.source = overrides.source;
                }
                if existing.stacks < limit {
                    existing.stacks += 1;
                    (ApplyAction::Stacked, existing.stacks)
                } else {
                    (ApplyAction::Refreshed, existing.stacks)
                }
            }
            None => {
                self.clock += 1;
                self.effects.push(ActiveEffect {
                    id: template.id.clone(),
                    stacks: 1,
                    remaining: duration,
                    source: overrides.source,
                    applied_at: self.clock,
                });
                (ApplyAction::Added, 1)
            }
        };
        debug_assert!(stacks >= 1 && stacks <= limit, "stack count out of bounds");

        tracing::debug!(effect = %template.id, %action, stacks, "effect applied");

        let combo = if scan_combos && action != ApplyAction::Refreshed {
            self.try_combo(&template.id)
        } else {
            None
        };

        Ok(ApplyOutcome {
            effect: template.id.clone(),
            action,
            stacks,
            combo,
        })
    }

    fn check_immunity(&self, template: &EffectTemplate) -> Result<(), ApplyRejection> {
        let from_effects = self.effects.iter().find_map(|active| {
            let granting = self.template(active.id.as_str())?;
            granting
                .payload
                .immunities
                .blocks(template)
                .then(|| active.id.clone())
        });
        let granted_by = from_effects.or_else(|| {
            self.auras
                .iter()
                .find(|aura| aura.payload.immunities.blocks(template))
                .map(|aura| aura.id.clone())
        });

        match granted_by {
            Some(granted_by) => {
                tracing::debug!(effect = %template.id, %granted_by, "application blocked by immunity");
                Err(ApplyRejection::Immune {
                    effect: template.id.clone(),
                    granted_by,
                })
            }
            None => Ok(()),
        }
    }

    fn check_resistance(&self, template: &EffectTemplate) -> Result<(), ApplyRejection> {
        let counter = self
            .catalog
            .resistance_rules()
            .iter()
            .filter(|rule| rule.effect == template.id)
            .find(|rule| self.has_effect(rule.countered_by.as_str()));

        match counter {
            Some(rule) => {
                tracing::debug!(effect = %template.id, countered_by = %rule.countered_by, "application countered");
                Err(ApplyRejection::Countered {
                    effect: template.id.clone(),
                    countered_by: rule.countered_by.clone(),
                })
            }
            None => Ok(()),
        }
    }

    /// Fires the first combo that `trigger` completes.
    ///
    /// The result is applied without re-scanning combos, so a single `apply`
    /// fires at most one combo. An aura satisfies a requirement like any
    /// active effect but is never consumed.
    fn try_combo(&mut self, trigger: &EffectId) -> Option<ComboTrigger> {
        let catalog = Arc::clone(&self.catalog);
        let rule = catalog.combo_rules().iter().find(|rule| {
            rule.involves(trigger) && rule.requires.iter().all(|id| self.holds(id))
        })?;

        let consumed: Vec<EffectId> = rule
            .requires
            .iter()
            .filter(|id| self.effects.iter().any(|e| &e.id == *id))
            .cloned()
            .collect();
        self.effects.retain(|e| !rule.involves(&e.id));

        let applied = match self.template(rule.result.as_str()).cloned() {
            Some(result) => self
                .apply_resolved(
                    &result,
                    ApplyOverrides::from_source(format!("combo:{}", rule.name)),
                    false,
                )
                .map(|outcome| outcome.action),
            None => Err(ApplyRejection::UnknownEffect(rule.result.clone())),
        };

        tracing::debug!(
            combo = %rule.name,
            result = %rule.result,
            applied = applied.is_ok(),
            "combo triggered"
        );

        Some(ComboTrigger {
            rule: rule.name.clone(),
            consumed,
            result: rule.result.clone(),
            bonus_damage: rule.bonus_damage,
            applied,
        })
    }

    fn holds(&self, id: &EffectId) -> bool {
        self.effects.iter().any(|e| &e.id == id) || self.auras.iter().any(|a| &a.id == id)
    }

    // ========================================================================
    // Ticking
    // ========================================================================

    /// Processes one turn of every effect and aura.
    pub fn tick(&mut self, context: TickContext) -> TickReport {
        let mut report = TickReport::default();
        let catalog = self.catalog.as_ref();
        let adhoc = &self.adhoc;

        for effect in self.effects.iter_mut() {
            if let Some(template) = lookup(catalog, adhoc, effect.id.as_str()) {
                let entry = tick_payload(&effect.id, &template.payload, effect.stacks, context);
                push_entry(&mut report, entry);
            }
            if let Some(remaining) = effect.remaining.as_mut() {
                debug_assert!(*remaining > 0, "effect survived past expiry");
                *remaining = remaining.saturating_sub(1);
            }
        }

        for aura in &self.auras {
            let entry = tick_payload(&aura.id, &aura.payload, 1, context);
            push_entry(&mut report, entry);
        }

        report.expired = self
            .effects
            .iter()
            .filter(|e| e.is_expired())
            .map(|e| e.id.clone())
            .collect();
        self.effects.retain(|e| !e.is_expired());

        if !report.expired.is_empty() {
            tracing::debug!(expired = ?report.expired, "effects expired");
        }
        report
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Folds every active effect and aura into one modifier set.
    pub fn modifiers(&self) -> AggregatedModifiers {
        let from_effects = self.effects.iter().filter_map(|active| {
            self.template(active.id.as_str())
                .map(|template| (&template.payload, active.stacks))
        });
        let from_auras = self.auras.iter().map(|aura| (&aura.payload, 1));
        AggregatedModifiers::fold(from_effects.chain(from_auras))
    }

    /// True if an effect or aura with this id is active.
    pub fn has_effect(&self, id: &str) -> bool {
        self.effects.iter().any(|e| e.id == id) || self.auras.iter().any(|a| a.id == id)
    }

    pub fn effect(&self, id: &str) -> Option<&ActiveEffect> {
        self.effects.iter().find(|e| e.id == id)
    }

    pub fn stacks(&self, id: &str) -> u8 {
        self.effect(id).map_or(0, |e| e.stacks)
    }

    pub fn active_effects(&self) -> &[ActiveEffect] {
        &self.effects
    }

    pub fn active_auras(&self) -> &[Aura] {
        &self.auras
    }

    /// True while a timed effect with [`EffectFlags::STUNNED`] is active.
    ///
    /// Until-cleansed instances and auras never incapacitate, so a stunned
    /// combatant always recovers by ticking.
    pub fn is_incapacitated(&self) -> bool {
        self.effects.iter().any(|active| {
            active.is_timed()
                && self
                    .template(active.id.as_str())
                    .is_some_and(|t| t.payload.flags.contains(EffectFlags::STUNNED))
        })
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Removes own debuffs (by default) in cleanse-priority order.
    pub fn cleanse(&mut self, options: CleanseOptions) -> Result<Vec<EffectId>, RemovalError> {
        self.strip(options, EffectCategory::Debuff)
    }

    /// Removes buffs (by default); used against the opposing side.
    pub fn dispel(&mut self, options: CleanseOptions) -> Result<Vec<EffectId>, RemovalError> {
        self.strip(options, EffectCategory::Buff)
    }

    fn strip(
        &mut self,
        options: CleanseOptions,
        default_category: EffectCategory,
    ) -> Result<Vec<EffectId>, RemovalError> {
        if let Some(id) = options.specific {
            self.remove_effect(id.as_str())?;
            return Ok(vec![id]);
        }

        let category = options.category.unwrap_or(default_category);
        let mut candidates: Vec<(usize, usize, EffectId)> = self
            .effects
            .iter()
            .enumerate()
            .filter_map(|(index, active)| {
                let template = self.template(active.id.as_str())?;
                (template.category == category && template.is_removable()).then(|| {
                    let priority = self.catalog.priority_of(&active.id).unwrap_or(usize::MAX);
                    (priority, index, active.id.clone())
                })
            })
            .collect();
        candidates.sort_by_key(|(priority, index, _)| (*priority, *index));

        let removed: Vec<EffectId> = candidates
            .into_iter()
            .take(options.count)
            .map(|(_, _, id)| id)
            .collect();
        self.effects.retain(|e| !removed.contains(&e.id));

        tracing::debug!(%category, removed = ?removed, "effects stripped");
        Ok(removed)
    }

    /// Removes one effect explicitly.
    pub fn remove_effect(&mut self, id: &str) -> Result<(), RemovalError> {
        let index = self
            .effects
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| RemovalError::NotFound(id.into()))?;

        if self.template(id).is_some_and(|t| !t.is_removable()) {
            return Err(RemovalError::CannotRemove(id.into()));
        }

        self.effects.remove(index);
        Ok(())
    }

    /// Removes every effect flagged to break on `trigger`.
    pub fn break_on(&mut self, trigger: BreakTrigger) -> Vec<EffectId> {
        let flag = trigger.flag();
        let broken: Vec<EffectId> = self
            .effects
            .iter()
            .filter(|active| {
                self.template(active.id.as_str())
                    .is_some_and(|t| t.payload.flags.contains(flag))
            })
            .map(|active| active.id.clone())
            .collect();
        self.effects.retain(|e| !broken.contains(&e.id));
        broken
    }

    /// Adds or replaces a permanent aura. Returns true if it was new.
    pub fn add_aura(
        &mut self,
        id: impl Into<EffectId>,
        name: impl Into<String>,
        payload: EffectPayload,
    ) -> bool {
        let aura = Aura::new(id, name, payload);
        match self.auras.iter_mut().find(|a| a.id == aura.id) {
            Some(existing) => {
                *existing = aura;
                false
            }
            None => {
                self.auras.push(aura);
                true
            }
        }
    }

    pub fn remove_aura(&mut self, id: &str) -> Result<Aura, RemovalError> {
        let index = self
            .auras
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| RemovalError::NotFound(id.into()))?;
        Ok(self.auras.remove(index))
    }

    /// Drops every temporary effect, and auras too unless `keep_auras`.
    pub fn clear(&mut self, keep_auras: bool) {
        self.effects.clear();
        if !keep_auras {
            self.auras.clear();
        }
    }
}

fn tick_payload(id: &EffectId, payload: &EffectPayload, stacks: u8, context: TickContext) -> TickEntry {
    let n = u32::from(stacks);
    let pct_heal = (u64::from(context.max_hp) * u64::from(payload.heal_pct_max_hp) / 100)
        .min(u64::from(u32::MAX)) as u32;
    TickEntry {
        id: id.clone(),
        stacks,
        damage: payload.damage_per_turn.saturating_mul(n),
        heal: payload
            .heal_per_turn
            .saturating_add(pct_heal)
            .saturating_mul(n),
    }
}

fn push_entry(report: &mut TickReport, entry: TickEntry) {
    if entry.damage == 0 && entry.heal == 0 {
        return;
    }
    report.total_damage = report.total_damage.saturating_add(entry.damage);
    report.total_heal = report.total_heal.saturating_add(entry.heal);
    report.per_effect.push(entry);
}
