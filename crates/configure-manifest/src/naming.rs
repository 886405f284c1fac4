//! Naming conventions shared with the registry and documentation tooling
//!
//! Plugins are named in snake_case; the registry refers to them through a
//! PascalCase identifier variant.

/// Convert a snake_case plugin name to its PascalCase identifier variant
///
/// Each `_`-separated segment is capitalized and the rest of the segment is
/// lowercased:
/// - cpu -> Cpu
/// - cpu_usage -> CpuUsage
/// - modbus_tcp -> ModbusTcp
pub fn snake_to_pascal(name: &str) -> String {
    name.split('_').map(capitalize).collect()
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::naming::*;

    #[test]
    fn test_snake_to_pascal() {
        assert_eq!(snake_to_pascal("cpu"), "Cpu");
        assert_eq!(snake_to_pascal("cpu_usage"), "CpuUsage");
        assert_eq!(snake_to_pascal("twamp_reflector"), "TwampReflector");
        assert_eq!(snake_to_pascal("block_io"), "BlockIo");

        // Segments are lowercased after the first letter
        assert_eq!(snake_to_pascal("modbus_TCP"), "ModbusTcp");

        // Empty segments vanish
        assert_eq!(snake_to_pascal("a__b"), "AB");
        assert_eq!(snake_to_pascal(""), "");
    }
}
