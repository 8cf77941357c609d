//! The unit catalog: base units, named units, symbols and prefixes.
//!
//! Identifier resolution in the parser runs against these tables; the system
//! itself is read-only during a parse.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::dimension::MAX_BASES;
use crate::error::{Error, Result};
use crate::unit::Unit;

#[derive(Debug, Default)]
pub struct UnitSystem {
    n_bases: usize,
    by_name: HashMap<String, Unit>,
    by_symbol: HashMap<String, Unit>,
    /// Longest prefix first, so lookup is a linear scan with first match.
    name_prefixes: Vec<(String, f64)>,
    symbol_prefixes: Vec<(String, f64)>,
}

impl UnitSystem {
    pub fn new() -> UnitSystem {
        UnitSystem::default()
    }

    /// Register a new base unit under `name` and `symbol` and return it.
    pub fn add_base_unit(&mut self, name: &str, symbol: &str) -> Result<Unit> {
        if self.n_bases == MAX_BASES {
            return Err(Error::TooManyBaseUnits(MAX_BASES));
        }
        let unit = Unit::base(self.n_bases);
        self.n_bases += 1;
        self.map_name_to_unit(name, &unit)?;
        self.map_symbol_to_unit(symbol, &unit)?;
        Ok(unit)
    }

    pub fn map_name_to_unit(&mut self, name: &str, unit: &Unit) -> Result<()> {
        if self.by_name.contains_key(name) {
            return Err(Error::NameInUse(name.into()));
        }
        self.by_name.insert(name.into(), unit.clone());
        Ok(())
    }

    pub fn map_symbol_to_unit(&mut self, symbol: &str, unit: &Unit) -> Result<()> {
        if self.by_symbol.contains_key(symbol) {
            return Err(Error::SymbolInUse(symbol.into()));
        }
        self.by_symbol.insert(symbol.into(), unit.clone());
        Ok(())
    }

    pub fn add_name_prefix(&mut self, name: &str, value: f64) -> Result<()> {
        Self::add_prefix(&mut self.name_prefixes, name, value)
    }

    pub fn add_symbol_prefix(&mut self, symbol: &str, value: f64) -> Result<()> {
        Self::add_prefix(&mut self.symbol_prefixes, symbol, value)
    }

    fn add_prefix(table: &mut Vec<(String, f64)>, text: &str, value: f64) -> Result<()> {
        if table.iter().any(|(p, _)| p == text) {
            return Err(Error::PrefixInUse(text.into()));
        }
        table.push((text.into(), value));
        table.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Ok(())
    }

    pub fn unit_by_name(&self, name: &str) -> Option<Unit> {
        self.by_name.get(name).cloned()
    }

    pub fn unit_by_symbol(&self, symbol: &str) -> Option<Unit> {
        self.by_symbol.get(symbol).cloned()
    }

    /// The registered time base, if the system has one. Systems without a
    /// `second` cannot carry timestamps.
    pub fn second(&self) -> Option<Unit> {
        self.unit_by_name("second")
    }

    /// The longest name prefix that starts `text`, as `(factor, byte_len)`.
    pub fn prefix_by_name(&self, text: &str) -> Option<(f64, usize)> {
        Self::prefix_of(&self.name_prefixes, text)
    }

    /// The longest symbol prefix that starts `text`, as `(factor, byte_len)`.
    pub fn prefix_by_symbol(&self, text: &str) -> Option<(f64, usize)> {
        Self::prefix_of(&self.symbol_prefixes, text)
    }

    fn prefix_of(table: &[(String, f64)], text: &str) -> Option<(f64, usize)> {
        if text.is_empty() {
            return None;
        }
        table
            .iter()
            .find(|(p, _)| text.len() > p.len() && text.starts_with(p.as_str()))
            .map(|(p, v)| (*v, p.len()))
    }

    /// The shared built-in SI catalog.
    pub fn si() -> &'static UnitSystem {
        static SI: Lazy<UnitSystem> = Lazy::new(|| {
            build_si().expect("failed to build the built-in SI catalog")
        });
        &SI
    }
}

/// Registers `singular`, its plural, and `symbol` for `unit`.
fn register(
    sys: &mut UnitSystem,
    singular: &str,
    symbol: &str,
    unit: &Unit,
) -> Result<()> {
    sys.map_name_to_unit(singular, unit)?;
    sys.map_name_to_unit(&format!("{singular}s"), unit)?;
    sys.map_symbol_to_unit(symbol, unit)?;
    Ok(())
}

fn build_si() -> Result<UnitSystem> {
    let mut sys = UnitSystem::new();

    let meter = sys.add_base_unit("meter", "m")?;
    sys.map_name_to_unit("meters", &meter)?;
    sys.map_name_to_unit("metre", &meter)?;
    sys.map_name_to_unit("metres", &meter)?;

    let kilogram = sys.add_base_unit("kilogram", "kg")?;
    sys.map_name_to_unit("kilograms", &kilogram)?;
    let gram = kilogram.scale(1e-3);
    register(&mut sys, "gram", "g", &gram)?;

    let second = sys.add_base_unit("second", "s")?;
    sys.map_name_to_unit("seconds", &second)?;
    sys.map_name_to_unit("sec", &second)?;

    let ampere = sys.add_base_unit("ampere", "A")?;
    sys.map_name_to_unit("amperes", &ampere)?;

    let kelvin = sys.add_base_unit("kelvin", "K")?;
    sys.map_name_to_unit("kelvins", &kelvin)?;

    let mole = sys.add_base_unit("mole", "mol")?;
    sys.map_name_to_unit("moles", &mole)?;

    let candela = sys.add_base_unit("candela", "cd")?;
    sys.map_name_to_unit("candelas", &candela)?;

    // Derived units the catalog names directly.
    let hertz = Unit::one().divide(&second)?;
    sys.map_name_to_unit("hertz", &hertz)?;
    sys.map_symbol_to_unit("Hz", &hertz)?;

    let newton = kilogram
        .multiply(&meter)?
        .divide(&second.raise(2)?)?;
    register(&mut sys, "newton", "N", &newton)?;

    let pascal = newton.divide(&meter.raise(2)?)?;
    register(&mut sys, "pascal", "Pa", &pascal)?;

    let joule = newton.multiply(&meter)?;
    register(&mut sys, "joule", "J", &joule)?;

    let watt = joule.divide(&second)?;
    register(&mut sys, "watt", "W", &watt)?;

    let celsius = kelvin.offset(273.15);
    sys.map_name_to_unit("celsius", &celsius)?;
    sys.map_name_to_unit("degree_celsius", &celsius)?;
    sys.map_symbol_to_unit("\u{B0}C", &celsius)?;

    let minute = second.scale(60.0);
    register(&mut sys, "minute", "min", &minute)?;
    let hour = second.scale(3600.0);
    register(&mut sys, "hour", "h", &hour)?;
    sys.map_name_to_unit("hr", &hour)?;
    let day = second.scale(86400.0);
    register(&mut sys, "day", "d", &day)?;

    let liter = meter.raise(3)?.scale(1e-3);
    register(&mut sys, "liter", "L", &liter)?;
    sys.map_name_to_unit("litre", &liter)?;

    let percent = Unit::one().scale(0.01);
    sys.map_name_to_unit("percent", &percent)?;
    sys.map_symbol_to_unit("%", &percent)?;

    let degree = Unit::one().scale(std::f64::consts::PI / 180.0);
    register(&mut sys, "degree", "\u{B0}", &degree)?;
    let arcminute = degree.scale(1.0 / 60.0);
    register(&mut sys, "arcminute", "'", &arcminute)?;
    let arcsecond = arcminute.scale(1.0 / 60.0);
    register(&mut sys, "arcsecond", "\"", &arcsecond)?;

    for (name, symbol, value) in SI_PREFIXES {
        sys.add_name_prefix(name, *value)?;
        sys.add_symbol_prefix(symbol, *value)?;
    }
    sys.add_name_prefix("deca", 1e1)?;
    sys.add_symbol_prefix("u", 1e-6)?;

    Ok(sys)
}

const SI_PREFIXES: &[(&str, &str, f64)] = &[
    ("yotta", "Y", 1e24),
    ("zetta", "Z", 1e21),
    ("exa", "E", 1e18),
    ("peta", "P", 1e15),
    ("tera", "T", 1e12),
    ("giga", "G", 1e9),
    ("mega", "M", 1e6),
    ("kilo", "k", 1e3),
    ("hecto", "h", 1e2),
    ("deka", "da", 1e1),
    ("deci", "d", 1e-1),
    ("centi", "c", 1e-2),
    ("milli", "m", 1e-3),
    ("micro", "\u{B5}", 1e-6),
    ("nano", "n", 1e-9),
    ("pico", "p", 1e-12),
    ("femto", "f", 1e-15),
    ("atto", "a", 1e-18),
    ("zepto", "z", 1e-21),
    ("yocto", "y", 1e-24),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_and_name_tables_are_distinct() {
        let si = UnitSystem::si();
        assert!(si.unit_by_name("second").is_some());
        assert!(si.unit_by_name("s").is_none());
        assert!(si.unit_by_symbol("s").is_some());
    }

    #[test]
    fn prefix_lookup_is_longest_match() {
        let si = UnitSystem::si();
        // "microm..." must match micro (5 chars), not milli's m-symbol.
        let (value, len) = si.prefix_by_name("micrometer").unwrap();
        assert_eq!(len, 5);
        assert!((value - 1e-6).abs() < 1e-18);
        let (value, len) = si.prefix_by_symbol("mm").unwrap();
        assert_eq!(len, 1);
        assert!((value - 1e-3).abs() < 1e-12);
    }

    #[test]
    fn prefix_never_consumes_the_whole_identifier() {
        let si = UnitSystem::si();
        assert!(si.prefix_by_name("pico").is_none());
        assert!(si.prefix_by_name("picosecond").is_some());
    }

    #[test]
    fn base_unit_slots_are_bounded() {
        let mut sys = UnitSystem::new();
        for i in 0..MAX_BASES {
            sys.add_base_unit(&format!("base{i}"), &format!("b{i}")).unwrap();
        }
        assert!(matches!(
            sys.add_base_unit("extra", "x"),
            Err(Error::TooManyBaseUnits(_))
        ));
    }
}
