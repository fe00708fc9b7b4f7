//! Given steps for tutoring match BDD scenarios.

use super::world::{TutoringWorld, parse_subject, run_async};
use chrono::TimeDelta;
use eyre::WrapErr;
use mockable::Clock;
use rstest_bdd_macros::given;
use tutorlink::{
    availability::{ServiceHours, ServiceWindow, parse_time_of_day},
    routing::domain::{RequesterId, SessionHandle, SpecialistId, SubjectSet},
};

#[given(r#"a specialist {id:u64} covering "{subject}""#)]
fn a_specialist_covering(
    world: &mut TutoringWorld,
    id: u64,
    subject: String,
) -> Result<(), eyre::Report> {
    let parsed = parse_subject(&subject)?;
    run_async(
        world
            .service()
            .upsert_specialist(SpecialistId::new(id), SubjectSet::from([parsed])),
    );
    Ok(())
}

#[given(r#"service hours from "{start}" to "{end}""#)]
fn service_hours_from(
    world: &mut TutoringWorld,
    start: String,
    end: String,
) -> Result<(), eyre::Report> {
    if world.has_service() {
        return Err(eyre::eyre!("service hours must be set before anything else"));
    }
    let window = ServiceWindow::parse(&start, &end).wrap_err("parse service window")?;
    world.service_hours = ServiceHours::from_windows([window]).wrap_err("build service hours")?;
    Ok(())
}

#[given(r#"the time is "{time}""#)]
fn the_time_is(world: &mut TutoringWorld, time: String) -> Result<(), eyre::Report> {
    let time_of_day = parse_time_of_day(&time).wrap_err("parse time of day")?;
    world.clock.set_time_of_day(time_of_day)
}

#[given("specialist {id:u64} was released {minutes:i64} minutes ago")]
fn specialist_was_released(
    world: &mut TutoringWorld,
    id: u64,
    minutes: i64,
) -> Result<(), eyre::Report> {
    let clock = std::sync::Arc::clone(&world.clock);
    let now = clock.utc();
    let specialist = SpecialistId::new(id);
    let helper = RequesterId::new(1_000 + id);

    clock.set(now - TimeDelta::minutes(minutes))?;
    let service = world.service();
    run_async(async {
        service.open_session(helper, SessionHandle::new(0)).await;
        service.invite(helper, specialist).await?;
        service.complete(helper, specialist).await?;
        Ok::<_, tutorlink::routing::services::MatchingServiceError>(())
    })
    .wrap_err("engage and release specialist")?;
    clock.set(now)
}
