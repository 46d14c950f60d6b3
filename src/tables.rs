use comfy_table::{Attribute, Cell, Color, Table, modifiers, presets};

use crate::{api::QueryKind, config::FlowConfig, flow::Flow, prelude::*};

pub fn build_controls_table(config: &FlowConfig, flow: &Flow) -> Result<Table> {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table.set_header(vec!["ID", "Name", "Inverter", "Query", "Operation", "State"]);
    for control in &config.controls {
        let dispatcher = flow.dispatcher(&control.id)?;
        let inverter = control
            .inverter
            .as_deref()
            .and_then(|id| config.inverters.iter().find(|inverter| inverter.id == id))
            .map_or_else(
                || String::from("–"),
                |inverter| format!("{} ({}:{})", inverter.name, inverter.host, inverter.port),
            );
        let operation = dispatcher.query().parse::<QueryKind>().map_or(
            Cell::new("?").fg(Color::DarkYellow),
            |kind| Cell::new(kind.operation()),
        );
        let state = if dispatcher.is_configured() {
            Cell::new("ready").fg(Color::Green)
        } else {
            Cell::new("unconfigured").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(dispatcher.id()),
            Cell::new(dispatcher.name()).add_attribute(Attribute::Dim),
            Cell::new(inverter),
            Cell::new(dispatcher.query()),
            operation,
            state,
        ]);
    }
    Ok(table)
}
