//! Rejeu d'un script contre une session

use std::time::Instant;

use tracing::{debug, info, warn};

use geozone::{MapSurface, RecordingSurface, Session, Thresholds, ZoneError};

use crate::report::{ReplayReport, StepError};
use crate::script::{ScriptLine, Step};

/// Applique une étape; `Ok(false)` si la session l'a refusée
pub fn apply<S: MapSurface>(
    session: &mut Session<S>,
    step: &Step,
    thresholds: &Thresholds,
) -> Result<bool, ZoneError> {
    match step {
        Step::PointerDown { .. }
        | Step::PointerMove { .. }
        | Step::PointerUp { .. }
        | Step::CaptureLost
        | Step::ShapeClicked { .. } => {
            if let Some(event) = step.surface_event() {
                session.handle_event(event)?;
            }
            Ok(true)
        }
        Step::StartCreation => Ok(session.start_creation()),
        Step::StopCreation => Ok(session.stop_creation()),
        Step::Select { id } => session.select_zone(*id),
        Step::StartEdit { id } => session.start_edit(*id),
        Step::Edit { name, zone_type } => {
            session.set_edit_buffer(name.as_str(), *zone_type)?;
            Ok(true)
        }
        Step::Save {
            id,
            name,
            zone_type,
        } => {
            session.save_edit(*id, name.as_str(), *zone_type)?;
            Ok(true)
        }
        Step::Cancel { id } => {
            session.cancel_edit(*id)?;
            Ok(true)
        }
        Step::Delete { id } => {
            session.delete_zone(*id)?;
            Ok(true)
        }
        Step::Localize { id } => Ok(session.request_localize(*id)),
        Step::SetActive { id, active } => {
            session.set_zone_active(*id, *active)?;
            Ok(true)
        }
        Step::Sample { id, values } => {
            session.apply_thresholds(*id, values, thresholds)?;
            Ok(true)
        }
        Step::Group { name, members } => {
            session.create_group(name.as_str(), members)?;
            Ok(true)
        }
    }
}

/// Rejoue toutes les étapes; les erreurs sont consignées et le rejeu continue
pub fn run(
    session: &mut Session<RecordingSurface>,
    steps: &[ScriptLine],
    thresholds: &Thresholds,
    report: &mut ReplayReport,
) {
    let start = Instant::now();

    for ScriptLine { line, step } in steps {
        let op = step.op();
        match apply(session, step, thresholds) {
            Ok(true) => report.record_applied(op),
            Ok(false) => {
                debug!(line, op, state = session.state().name(), "Step refused");
                report.record_refused(op);
            }
            Err(e) => {
                warn!(line, op, error = %e, "Step failed");
                report.record_error(StepError {
                    line: *line,
                    op: op.to_string(),
                    message: e.to_string(),
                });
            }
        }

        if !session.invariants_hold() {
            report.record_warning(format!("line {}: session invariants violated", line));
        }
    }

    let zones = session.list_zones();
    report.zones_final = zones.len();
    report.zones_active = zones.iter().filter(|z| z.active).count();
    report.final_state = session.state().name().to_string();
    report.surface_commands = session.surface().commands().len();
    report.navigation_enabled = session.surface().navigation_enabled();

    if !session.state().is_idle() {
        report.record_warning(format!(
            "script ended in state {}",
            session.state().name()
        ));
    }

    report.set_duration(start.elapsed());
    report.finalize();

    info!(
        steps = steps.len(),
        zones = report.zones_final,
        errors = report.errors.len(),
        "Replay complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReplayStatus;
    use crate::script;
    use geozone::ZoneType;

    #[test]
    fn test_run_draw_and_save() {
        let steps = script::parse(
            r#"{"op":"start_creation"}
{"op":"pointer_down","lat":51.5,"lng":-0.1}
{"op":"pointer_move","lat":51.505,"lng":-0.09}
{"op":"pointer_up","lat":51.51,"lng":-0.08}
{"op":"save","id":1,"name":"Thames","zone_type":"wind"}"#,
        )
        .unwrap();

        let mut session = Session::new(RecordingSurface::new());
        let mut report = ReplayReport::new("inline");
        run(&mut session, &steps, &Thresholds::new(), &mut report);

        assert_eq!(report.status, ReplayStatus::Success);
        assert_eq!(report.steps_applied, 5);
        assert_eq!(report.zones_final, 1);
        assert_eq!(report.final_state, "idle");
        assert!(report.navigation_enabled);
        assert!(report.warnings.is_empty());

        let zone = session.list_zones()[0].clone();
        assert_eq!(zone.name, "Thames");
        assert_eq!(zone.zone_type, ZoneType::Wind);
    }

    #[test]
    fn test_run_records_errors_and_continues() {
        let steps = script::parse(
            r#"{"op":"delete","id":42}
{"op":"start_creation"}
{"op":"start_creation"}"#,
        )
        .unwrap();

        let mut session = Session::new(RecordingSurface::new());
        let mut report = ReplayReport::new("inline");
        run(&mut session, &steps, &Thresholds::new(), &mut report);

        assert_eq!(report.status, ReplayStatus::PartialSuccess);
        assert_eq!(report.errors[0].line, 1);
        assert_eq!(report.steps_refused, 1);
        assert!(!report.navigation_enabled);
        assert_eq!(report.warnings.len(), 1);
    }
}
