use crate::error::CsvParseError;

use super::v4::{V4Endpoint, parse_v4_endpoint};
use super::v6::{V6Endpoint, parse_v6_endpoint};

/// Parses a comma-separated list of IPv4 endpoints.
///
/// `max == 0` means unbounded; otherwise parsing stops after `max`
/// successful items. With `ignore_errors == false` the first invalid item
/// aborts the whole list and the error names the offending substring
/// verbatim; with `ignore_errors == true` invalid items (including empty
/// ones) are skipped silently.
///
/// Unlike the original C implementation's `ap_pton_inet_csv`, which requires
/// a separate null-destination call to learn how many items *would* be
/// written before allocating, this returns an owned `Vec` directly — there
/// is no pre-sizing step to replicate.
pub fn parse_csv_v4(
    input: &str,
    max: usize,
    ignore_errors: bool,
) -> Result<Vec<V4Endpoint>, CsvParseError> {
    let mut out = Vec::new();

    for item in input.split(',') {
        if max != 0 && out.len() >= max {
            break;
        }

        if item.is_empty() {
            if ignore_errors {
                continue;
            }
            return Err(CsvParseError::EmptyItem);
        }

        match parse_v4_endpoint(item) {
            Ok(endpoint) => out.push(endpoint),
            Err(source) => {
                if ignore_errors {
                    continue;
                }
                return Err(CsvParseError::Item {
                    item: item.to_string(),
                    source,
                });
            }
        }
    }

    Ok(out)
}

/// Parses a comma-separated list of IPv6 endpoints. Same semantics as
/// [`parse_csv_v4`].
pub fn parse_csv_v6(
    input: &str,
    max: usize,
    ignore_errors: bool,
) -> Result<Vec<V6Endpoint>, CsvParseError> {
    let mut out = Vec::new();

    for item in input.split(',') {
        if max != 0 && out.len() >= max {
            break;
        }

        if item.is_empty() {
            if ignore_errors {
                continue;
            }
            return Err(CsvParseError::EmptyItem);
        }

        match parse_v6_endpoint(item) {
            Ok(endpoint) => out.push(endpoint),
            Err(source) => {
                if ignore_errors {
                    continue;
                }
                return Err(CsvParseError::Item {
                    item: item.to_string(),
                    source,
                });
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_v4_destinations() {
        let list = parse_csv_v4("224.6.6.6:2345,10.0.0.1:3456", 0, false).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].port, 3456);
    }

    #[test]
    fn strict_mode_reports_offending_item() {
        let err = parse_csv_v4("224.6.6.6:2345,224.6.6.6:70000", 0, false).unwrap_err();
        match err {
            CsvParseError::Item { item, .. } => assert_eq!(item, "224.6.6.6:70000"),
            other => panic!("expected Item error, got {other:?}"),
        }
    }

    #[test]
    fn lenient_mode_skips_invalid_items() {
        let list = parse_csv_v4("224.6.6.6:2345,224.6.6.6:70000,10.0.0.1:80", 0, true).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn max_bounds_the_number_of_items_collected() {
        let list = parse_csv_v4("224.6.6.6:1,224.6.6.7:2,224.6.6.8:3", 2, false).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn empty_item_is_rejected_in_strict_mode() {
        let err = parse_csv_v4("224.6.6.6:1,,224.6.6.7:2", 0, false).unwrap_err();
        assert!(matches!(err, CsvParseError::EmptyItem));
    }

    #[test]
    fn parses_multiple_v6_destinations() {
        let list =
            parse_csv_v6("[ff05::15]:1234,[ff05::16]:1234,[ff05::17]:1234", 0, false).unwrap();
        assert_eq!(list.len(), 3);
    }
}
