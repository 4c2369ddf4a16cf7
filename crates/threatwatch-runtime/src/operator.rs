//! Operator commands typed on the console's stdin.

use anyhow::{Context, bail};

use threatwatch_core::Position;

pub const HELP: &str = "\
commands:
  select <unit-id>              arm a unit for destination assignment
  pick <lat> <lon>              send the armed unit to a point
  cancel                        disarm without sending
  status                        uplink, unit summary and listing
  alerts                        active alerts
  risk                          units ranked by risk
  endpoint <ws-url> [api-url]   reconnect to another backend
  help                          this text
  quit                          leave the console";

#[derive(Debug, Clone, PartialEq)]
pub enum OperatorCommand {
    Select(String),
    Pick(Position),
    Cancel,
    Status,
    Alerts,
    Risk,
    Endpoint {
        stream_url: String,
        api_url: Option<String>,
    },
    Help,
    Quit,
}

/// `Ok(None)` for a blank line.
pub fn parse_command(line: &str) -> anyhow::Result<Option<OperatorCommand>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("select", [unit_id]) => OperatorCommand::Select((*unit_id).to_string()),
        ("select", _) => bail!("usage: select <unit-id>"),
        ("pick", [lat, lon]) => OperatorCommand::Pick(parse_position(lat, lon)?),
        ("pick", _) => bail!("usage: pick <lat> <lon>"),
        ("cancel", []) => OperatorCommand::Cancel,
        ("status", []) => OperatorCommand::Status,
        ("alerts", []) => OperatorCommand::Alerts,
        ("risk", []) => OperatorCommand::Risk,
        ("endpoint", [stream_url]) => OperatorCommand::Endpoint {
            stream_url: (*stream_url).to_string(),
            api_url: None,
        },
        ("endpoint", [stream_url, api_url]) => OperatorCommand::Endpoint {
            stream_url: (*stream_url).to_string(),
            api_url: Some((*api_url).to_string()),
        },
        ("endpoint", _) => bail!("usage: endpoint <ws-url> [api-url]"),
        ("help" | "?", []) => OperatorCommand::Help,
        ("quit" | "exit", []) => OperatorCommand::Quit,
        (
            "cancel" | "status" | "alerts" | "risk" | "help" | "?" | "quit" | "exit",
            _,
        ) => bail!("{verb} takes no arguments"),
        _ => bail!("unknown command {verb:?} (try help)"),
    };
    Ok(Some(command))
}

fn parse_position(lat: &str, lon: &str) -> anyhow::Result<Position> {
    let lat: f64 = lat.parse().with_context(|| format!("invalid latitude {lat:?}"))?;
    let lon: f64 = lon.parse().with_context(|| format!("invalid longitude {lon:?}"))?;
    if !(-90.0..=90.0).contains(&lat) {
        bail!("latitude {lat} out of range [-90, 90]");
    }
    if !(-180.0..=180.0).contains(&lon) {
        bail!("longitude {lon} out of range [-180, 180]");
    }
    Ok(Position::new(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn select_and_pick() {
        assert_eq!(
            parse_command("select alpha-1").unwrap(),
            Some(OperatorCommand::Select("alpha-1".into()))
        );
        assert_eq!(
            parse_command("pick 37.81 -122.45").unwrap(),
            Some(OperatorCommand::Pick(Position::new(37.81, -122.45)))
        );
    }

    #[test]
    fn verbs_are_case_insensitive() {
        assert_eq!(parse_command("CANCEL").unwrap(), Some(OperatorCommand::Cancel));
        assert_eq!(parse_command("Quit").unwrap(), Some(OperatorCommand::Quit));
    }

    #[test]
    fn endpoint_with_and_without_api() {
        assert_eq!(
            parse_command("endpoint ws://h/ws").unwrap(),
            Some(OperatorCommand::Endpoint {
                stream_url: "ws://h/ws".into(),
                api_url: None
            })
        );
        assert_eq!(
            parse_command("endpoint ws://h/ws http://h/api").unwrap(),
            Some(OperatorCommand::Endpoint {
                stream_url: "ws://h/ws".into(),
                api_url: Some("http://h/api".into())
            })
        );
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(parse_command("pick 37.81").is_err());
        assert!(parse_command("pick north west").is_err());
        assert!(parse_command("pick 91 0").is_err());
        assert!(parse_command("pick 0 -181").is_err());
        assert!(parse_command("select").is_err());
        assert!(parse_command("status now").is_err());
        let err = parse_command("launch").unwrap_err();
        assert!(err.to_string().contains("unknown command"));
    }
}
