use crate::Lease;

#[derive(Default)]
struct PartialLease {
    ip_address: String,
    mac_address: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

impl PartialLease {
    fn finish(self) -> Option<Lease> {
        Some(Lease {
            ip_address: self.ip_address,
            mac_address: self.mac_address?,
            start: self.start,
            end: self.end,
        })
    }
}

/// Parses ISC dhcpd leases text. Blocks without a hardware address are skipped.
pub fn parse_leases(text: &str) -> Vec<Lease> {
    let mut leases = Vec::new();
    let mut current: Option<PartialLease> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("lease ") {
            let ip_address = rest.trim_end_matches('{').trim();
            current = Some(PartialLease {
                ip_address: ip_address.to_owned(),
                ..Default::default()
            });
            continue;
        }

        if line == "}" {
            if let Some(lease) = current.take().and_then(PartialLease::finish) {
                leases.push(lease);
            }
            continue;
        }

        let Some(lease) = current.as_mut() else {
            continue;
        };
        let statement = line.trim_end_matches(';');
        if let Some(mac) = statement.strip_prefix("hardware ethernet ") {
            lease.mac_address = Some(mac.trim().to_owned());
        } else if let Some(time) = statement.strip_prefix("starts ") {
            lease.start = Some(timestamp(time));
        } else if let Some(time) = statement.strip_prefix("ends ") {
            lease.end = Some(timestamp(time));
        }
    }

    leases
}

// "4 2011/08/18 22:01:08" -> "2011/08/18 22:01:08"
fn timestamp(value: &str) -> String {
    let value = value.trim();
    match value.split_once(' ') {
        Some((weekday, rest)) if weekday.len() == 1 => rest.trim().to_owned(),
        _ => value.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_blocks() {
        let leases = parse_leases(
            "lease 10.0.0.2 {\n  starts 1 2024/01/01 00:00:00;\n  ends 1 2024/01/01 00:30:00;\n  hardware ethernet 00:50:56:aa:bb:cc;\n}\n",
        );
        assert_eq!(
            leases,
            vec![Lease {
                ip_address: "10.0.0.2".to_owned(),
                mac_address: "00:50:56:aa:bb:cc".to_owned(),
                start: Some("2024/01/01 00:00:00".to_owned()),
                end: Some("2024/01/01 00:30:00".to_owned()),
            }]
        );
    }

    #[test]
    fn skips_blocks_without_hardware() {
        let leases = parse_leases("lease 10.0.0.3 {\n  ends never;\n}\n");
        assert!(leases.is_empty());
    }
}
