use crate::models::aggregate::CombatStores;
use crate::models::combat::{
    AttributionState, CombatAction, CombatChannel, Element, FightClock, PendingArmorLoss,
    DUNGEON_MECHANIC, MECHANIC_ABILITY, PASSIVE_ABILITY, UNKNOWN_ABILITY,
};
use crate::models::reference::ReferenceData;
use crate::models::roster::Roster;
use crate::parsing::locale::{
    normalize_element, CARRYOVER_PHRASES, LOST_MARKER, NOISE_TOKENS, NON_COMBATANTS,
    PRIORITY_SOURCES, REFLECT_MECHANICS,
};
use crate::parsing::regex::{parse_grouped_number, RE_ACTION, RE_ARMOR_UNIT, RE_CAST, RE_DETAIL};

/// Everything a fight line may read or mutate.
pub struct CombatContext<'a> {
    pub state: &'a mut AttributionState,
    pub stores: &'a mut CombatStores,
    pub roster: &'a mut Roster,
    pub clock: &'a mut FightClock,
    pub reference: &'a ReferenceData,
    pub now_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatOutcome {
    /// Turn boundary; any pending armor loss was flushed as Neutral.
    Carryover,
    /// A cast announcement. `accepted` is false for non-combatant casters.
    Cast { caster: String, ability: String, accepted: bool, class_detected: bool },
    /// A numeric line folded into the stores.
    Folded(CombatAction),
    /// An armor loss held back until the next line discloses its element.
    Buffered(PendingArmorLoss),
    /// A zero-amount line, only used to resolve a pending armor loss.
    ElementOnly { element: Option<Element> },
    Unmatched,
}

/// Parenthesised annotations after the unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineDetails {
    pub element: Option<Element>,
    pub ability_override: Option<String>,
}

/// Classifies each `(token)` of an action suffix. Later tokens win.
pub fn extract_details(suffix: &str, current_ability: &str, reference: &ReferenceData) -> LineDetails {
    let mut details = LineDetails::default();
    for caps in RE_DETAIL.captures_iter(suffix) {
        let token = &caps["token"];
        if let Some(element) = normalize_element(token) {
            details.element = Some(element);
            continue;
        }
        if NOISE_TOKENS.contains(&token) {
            continue;
        }
        if let Some(known) = reference.match_ability(token) {
            details.ability_override = Some(known.to_string());
            continue;
        }
        let is_priority = PRIORITY_SOURCES.iter().any(|source| token.contains(source));
        let current_is_classed = reference.class_of(current_ability).is_some();
        if (is_priority || !current_is_classed) && !token.to_lowercase().contains(LOST_MARKER) {
            details.ability_override = Some(token.to_string());
        }
    }
    details
}

/// Runs one fight line (the text after its channel tag) through the
/// attribution state machine.
pub fn process_fight_content(content: &str, ctx: &mut CombatContext<'_>) -> CombatOutcome {
    let content = content.trim();
    let lower = content.to_lowercase();

    if CARRYOVER_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        flush_pending(ctx, Element::Neutral);
        ctx.state.clear_cast();
        return CombatOutcome::Carryover;
    }

    if let Some(caps) = RE_CAST.captures(content) {
        flush_pending(ctx, Element::Neutral);
        let caster = caps["caster"].trim().to_string();
        let ability = caps["ability"].trim().to_string();
        let accepted = !NON_COMBATANTS.iter().any(|decoy| caster.contains(decoy));
        let mut class_detected = false;
        if accepted {
            ctx.state.current_caster = Some(caster.clone());
            ctx.state.current_ability = ability.clone();
            class_detected = ctx.roster.detect_class(&caster, &ability, ctx.reference);
            if class_detected {
                tracing::debug!(actor = %caster, ability = %ability, "class detected");
            }
        }
        return CombatOutcome::Cast { caster, ability, accepted, class_detected };
    }

    let Some(caps) = RE_ACTION.captures(content) else {
        return CombatOutcome::Unmatched;
    };
    let target = caps["target"].trim().to_string();
    let sign = caps.name("sign").map(|m| m.as_str());
    let amount = parse_grouped_number(&caps["amount"]).unwrap_or(0);
    let is_armor = RE_ARMOR_UNIT.is_match(&caps["unit"]);
    let details = extract_details(caps["suffix"].trim(), &ctx.state.current_ability, ctx.reference);

    if let Some(pending) = ctx.state.take_pending() {
        let element = if pending.target == target {
            details.element.unwrap_or(Element::Neutral)
        } else {
            Element::Neutral
        };
        fold_pending(ctx, pending, element);
    }

    if amount == 0 {
        return CombatOutcome::ElementOnly { element: details.element };
    }
    ctx.clock.mark_started(ctx.now_ms);

    let (caster, ability) = attribute(ctx, &target, sign, details.ability_override);

    let (channel, element) = match (is_armor, sign) {
        (true, Some("-")) => {
            let pending = PendingArmorLoss { caster, ability, amount, target };
            ctx.state.pending_armor_loss = Some(pending.clone());
            return CombatOutcome::Buffered(pending);
        }
        (true, _) => (CombatChannel::ArmorGain, None),
        (false, Some("+")) => (CombatChannel::Heal, Some(details.element.unwrap_or(Element::Neutral))),
        (false, _) => (CombatChannel::Damage, Some(details.element.unwrap_or(Element::Neutral))),
    };

    let action = CombatAction { channel, actor: caster, ability, amount, element, target };
    ctx.stores.fold_action(&action);
    ctx.clock.mark_activity(ctx.now_ms);
    CombatOutcome::Folded(action)
}

/// Resolves who gets credit for a positive-amount line and under which name.
fn attribute(
    ctx: &CombatContext<'_>,
    target: &str,
    sign: Option<&str>,
    mut ability_override: Option<String>,
) -> (String, String) {
    let reference = ctx.reference;
    let roster = &*ctx.roster;
    let current_ability = ctx.state.current_ability.as_str();

    let mut caster = ctx
        .state
        .current_caster
        .clone()
        .unwrap_or_else(|| target.to_string());

    let resolved = ability_override.as_deref().unwrap_or(current_ability);
    if REFLECT_MECHANICS.iter().any(|mechanic| resolved.contains(mechanic)) {
        caster = target.to_string();
    }

    if sign == Some("+") {
        let caster_is_ally = roster.is_player_ally(&caster, reference);
        let target_is_ally = roster.is_player_ally(target, reference);

        if caster_is_ally && !target_is_ally {
            caster = target.to_string();
            ability_override.get_or_insert_with(|| MECHANIC_ABILITY.to_string());
        }
        if !caster_is_ally && !target_is_ally && caster != target {
            let name = ability_override.as_deref().unwrap_or(current_ability);
            if reference.class_of(name).is_none() {
                caster = target.to_string();
            }
        }
    }

    let mut ability = ability_override.unwrap_or_else(|| current_ability.to_string());

    if ability != UNKNOWN_ABILITY && ability != PASSIVE_ABILITY && caster != DUNGEON_MECHANIC {
        if let Some(class) = reference.class_of(&ability) {
            if roster.class_of(&caster) != Some(class) {
                if let Some(owner) = roster.first_with_class(class) {
                    tracing::trace!(from = %caster, to = %owner, ability = %ability, "signature reroute");
                    caster = owner.to_string();
                }
            }
        }
    }

    if let Some(master) = roster.master_of(&caster) {
        ability = format!("{} ({})", ability, caster);
        caster = master.to_string();
    }

    (caster, ability)
}

fn flush_pending(ctx: &mut CombatContext<'_>, element: Element) {
    if let Some(pending) = ctx.state.take_pending() {
        fold_pending(ctx, pending, element);
    }
}

fn fold_pending(ctx: &mut CombatContext<'_>, pending: PendingArmorLoss, element: Element) {
    let action = pending.into_action(element);
    ctx.stores.fold_action(&action);
    ctx.clock.mark_activity(ctx.now_ms);
}
