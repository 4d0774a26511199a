//! Parsing of the `/alert` slash command text.

/// The three fields every ingress adapter hands to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertParams {
    pub service: String,
    pub severity: String,
    pub message: String,
}

/// Parses `/alert` text such as `service=api severity=high message=Test alert`.
///
/// Leading `key=value` tokens set fields until `message=` is seen; every
/// token after it belongs to the message. When that does not yield all three
/// fields, text with at least three words is read positionally as
/// `service severity message...`. Returns `None` when neither form applies.
pub fn parse_alert_command(text: &str) -> Option<AlertParams> {
    let parts: Vec<&str> = text.split_whitespace().collect();

    let mut service = None;
    let mut severity = None;
    let mut message = None;

    for (idx, part) in parts.iter().enumerate() {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key {
            "message" => {
                let mut words = vec![value];
                words.extend_from_slice(&parts[idx + 1..]);
                message = Some(words.join(" "));
                break;
            }
            "service" => service = Some(value.to_string()),
            "severity" => severity = Some(value.to_string()),
            _ => {}
        }
    }

    match (service, severity, message) {
        (Some(service), Some(severity), Some(message)) => Some(AlertParams {
            service,
            severity,
            message,
        }),
        _ if parts.len() >= 3 => Some(AlertParams {
            service: parts[0].to_string(),
            severity: parts[1].to_string(),
            message: parts[2..].join(" "),
        }),
        _ => None,
    }
}
