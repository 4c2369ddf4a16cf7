//! One-shot command subcommands: `assign`, `register`, `telemetry`.

use anyhow::Context;

use threatwatch_core::Position;
use threatwatch_link::{CommandGateway, LinkConfig, RegisterUnit, TelemetryUpdate};

use crate::cli::{AssignOpts, RegisterOpts, TelemetryOpts};

/// Entry point for `threatwatch assign`.
pub async fn cmd_assign(config: LinkConfig, opts: &AssignOpts) -> anyhow::Result<()> {
    let gateway = CommandGateway::new(config)?;
    gateway
        .assign_destination(&opts.unit_id, Position::new(opts.lat, opts.lon))
        .await
        .with_context(|| format!("assign-destination for {}", opts.unit_id))?;
    println!("\u{2713} {} destination confirmed", opts.unit_id);
    Ok(())
}

/// Entry point for `threatwatch register`.
pub async fn cmd_register(config: LinkConfig, opts: &RegisterOpts) -> anyhow::Result<()> {
    let gateway = CommandGateway::new(config)?;
    let unit = gateway
        .register_unit(&register_request(opts))
        .await
        .with_context(|| format!("register-unit for {}", opts.unit_id))?;
    println!("{}", serde_json::to_string_pretty(&unit)?);
    Ok(())
}

/// Entry point for `threatwatch telemetry`.
pub async fn cmd_telemetry(config: LinkConfig, opts: &TelemetryOpts) -> anyhow::Result<()> {
    let gateway = CommandGateway::new(config)?;
    let unit = gateway
        .update_telemetry(&telemetry_request(opts))
        .await
        .with_context(|| format!("update-telemetry for {}", opts.unit_id))?;
    println!("{}", serde_json::to_string_pretty(&unit)?);
    Ok(())
}

fn register_request(opts: &RegisterOpts) -> RegisterUnit {
    RegisterUnit {
        unit_id: opts.unit_id.clone(),
        label: opts.label.clone(),
        position: Position::new(opts.lat, opts.lon),
        speed_mps: opts.speed,
        direction_deg: opts.direction,
    }
}

fn telemetry_request(opts: &TelemetryOpts) -> TelemetryUpdate {
    let position = match (opts.lat, opts.lon) {
        (Some(lat), Some(lon)) => Some(Position::new(lat, lon)),
        _ => None,
    };
    TelemetryUpdate {
        position,
        speed_mps: opts.speed,
        direction_deg: opts.direction,
        status: opts.status,
        ..TelemetryUpdate::new(opts.unit_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threatwatch_core::UnitStatus;

    #[test]
    fn register_request_from_opts() {
        let opts = RegisterOpts {
            unit_id: "alpha-1".into(),
            lat: 37.77,
            lon: -122.41,
            label: Some("Alpha".into()),
            speed: 3.0,
            direction: 45.0,
        };
        let request = register_request(&opts);
        assert_eq!(request.position, Position::new(37.77, -122.41));
        assert_eq!(request.label.as_deref(), Some("Alpha"));
        assert_eq!(request.direction_deg, 45.0);
    }

    #[test]
    fn telemetry_request_only_carries_given_fields() {
        let opts = TelemetryOpts {
            unit_id: "alpha-1".into(),
            lat: None,
            lon: None,
            speed: Some(1.5),
            direction: None,
            status: Some(UnitStatus::Offline),
        };
        let request = telemetry_request(&opts);
        assert_eq!(request.position, None);
        assert_eq!(request.speed_mps, Some(1.5));
        assert_eq!(request.status, Some(UnitStatus::Offline));
        assert_eq!(request.destination, None);
    }

    #[test]
    fn telemetry_request_pairs_coordinates() {
        let opts = TelemetryOpts {
            unit_id: "alpha-1".into(),
            lat: Some(1.0),
            lon: Some(2.0),
            speed: None,
            direction: None,
            status: None,
        };
        assert_eq!(telemetry_request(&opts).position, Some(Position::new(1.0, 2.0)));
    }
}
