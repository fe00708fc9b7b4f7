//! Then steps for tutoring match BDD scenarios.

use super::world::{TutoringWorld, run_async};
use rstest_bdd_macros::then;
use tutorlink::routing::{
    adapters::memory::RecordedNotification,
    domain::{DeferralReason, MatchOutcome, RequesterId, SpecialistId},
};

#[then("requester {id:u64} is matched with specialist {specialist:u64}")]
fn requester_is_matched(
    world: &mut TutoringWorld,
    id: u64,
    specialist: u64,
) -> Result<(), eyre::Report> {
    let outcome = world.outcome(id)?;
    let expected = MatchOutcome::Matched(SpecialistId::new(specialist));
    if outcome != expected {
        return Err(eyre::eyre!("expected {expected:?}, got {outcome:?}"));
    }
    Ok(())
}

#[then("requester {id:u64} is queued")]
fn requester_is_queued(world: &mut TutoringWorld, id: u64) -> Result<(), eyre::Report> {
    let outcome = world.outcome(id)?;
    if outcome != MatchOutcome::Queued {
        return Err(eyre::eyre!("expected requester {id} to be queued, got {outcome:?}"));
    }
    Ok(())
}

#[then("requester {id:u64} is being helped by specialist {specialist:u64}")]
fn requester_is_helped_by(
    world: &mut TutoringWorld,
    id: u64,
    specialist: u64,
) -> Result<(), eyre::Report> {
    let session = run_async(world.service().session(RequesterId::new(id)))
        .ok_or_else(|| eyre::eyre!("requester {id} has no session"))?;
    if !session.has_specialist(SpecialistId::new(specialist)) {
        return Err(eyre::eyre!(
            "requester {id} is not assigned specialist {specialist}: {:?}",
            session.assigned_specialists()
        ));
    }
    Ok(())
}

#[then("requester {id:u64} is told the service is closed")]
fn requester_told_closed(world: &mut TutoringWorld, id: u64) -> Result<(), eyre::Report> {
    let outcome = world.outcome(id)?;
    if outcome != MatchOutcome::Deferred(DeferralReason::OutOfHours) {
        return Err(eyre::eyre!("expected out-of-hours deferral, got {outcome:?}"));
    }
    let events = world
        .notifier
        .events()
        .map_err(|err| eyre::eyre!("read notifications: {err}"))?;
    let notified = events.iter().any(|event| {
        matches!(
            event,
            RecordedNotification::Deferred {
                requester,
                reason: DeferralReason::OutOfHours,
                ..
            } if *requester == RequesterId::new(id)
        )
    });
    if !notified {
        return Err(eyre::eyre!("no out-of-hours notification for requester {id}"));
    }
    Ok(())
}

#[then("specialist {specialist:u64} is idle")]
fn specialist_is_idle(world: &mut TutoringWorld, specialist: u64) -> Result<(), eyre::Report> {
    let busy = run_async(world.service().is_busy(SpecialistId::new(specialist)))
        .map_err(|err| eyre::eyre!("is_busy failed: {err}"))?;
    if busy {
        return Err(eyre::eyre!("specialist {specialist} is still busy"));
    }
    Ok(())
}

#[then("the queue holds {count:usize} requests")]
fn queue_holds(world: &mut TutoringWorld, count: usize) -> Result<(), eyre::Report> {
    let pending = run_async(world.service().pending_requests());
    if pending.len() != count {
        return Err(eyre::eyre!(
            "expected {count} queued requests, found {}",
            pending.len()
        ));
    }
    Ok(())
}
