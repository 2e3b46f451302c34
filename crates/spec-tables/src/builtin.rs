use crate::{CommandSpec, ContextTransition, ParamRange, ParamType};

const MODELING: &str = "modeling";
const SKETCH_ACTIVE: &str = "sketch_active";
const OPERATION_PENDING: &str = "operation_pending";

/// The built-in CAD command table.
///
/// Lifecycle: activating the dashboard enters `modeling`; a new sketch
/// enters `sketch_active` until it is finished; feature dashboards
/// (extrude, revolve) leave an `operation_pending` that accept or cancel
/// closes.
pub fn builtin_commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec::new("ProCmdDashboardActivate")
            .required()
            .in_context(&["startup", MODELING])
            .transition(ContextTransition::push(MODELING)),
        CommandSpec::new("ProCmdModelNew").in_context(&[MODELING]),
        CommandSpec::new("ProCmdModelSave").in_context(&[MODELING]),
        CommandSpec::new("ProCmdSketchNew")
            .in_context(&[MODELING])
            .transition(ContextTransition::push(SKETCH_ACTIVE)),
        CommandSpec::new("ProCmdSketchDone")
            .in_context(&[SKETCH_ACTIVE])
            .transition(ContextTransition::pop(SKETCH_ACTIVE)),
        CommandSpec::new("ProCmdExtrudeDashboard")
            .required()
            .in_context(&[SKETCH_ACTIVE])
            .param(
                "depth",
                ParamType::Numeric,
                Some(ParamRange::between(0.0, 10_000.0)),
            )
            .transition(ContextTransition::push(OPERATION_PENDING)),
        CommandSpec::new("ProCmdRevolveDashboard")
            .in_context(&[SKETCH_ACTIVE])
            .param(
                "angle",
                ParamType::Numeric,
                Some(ParamRange::between(0.0, 360.0)),
            )
            .transition(ContextTransition::push(OPERATION_PENDING)),
        CommandSpec::new("ProCmdDashboardAccept")
            .required()
            .in_context(&[OPERATION_PENDING])
            .transition(ContextTransition::pop(OPERATION_PENDING)),
        CommandSpec::new("ProCmdDashboardCancel")
            .in_context(&[OPERATION_PENDING])
            .transition(ContextTransition::pop(OPERATION_PENDING)),
    ]
}
