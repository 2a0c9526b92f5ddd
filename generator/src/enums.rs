use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    fmt,
};
use itertools::Itertools;
use crate::{
    config::BindingsConfig,
    ctype::{parse_enum_literal, EnumLiteral},
    extract::{self, EnumMember},
    util::{column_width, NameExt},
};

/// Bit index the `_MAX` sentinel is placed at.
const MAX_SENTINEL_BIT: u32 = 31;
const MAX_SENTINEL: &str = "_MAX";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconstructError {
    #[error("{enum_name}: member {member} has malformed flag value `{value}`")]
    MalformedValue {
        enum_name: String,
        member: String,
        value: String,
    },
    #[error("{enum_name}: member {member} is bit {index}, which does not fit in {width} bits")]
    BitOutOfRange {
        enum_name: String,
        member: String,
        index: u64,
        width: u32,
    },
}

/// Storage of a reconstructed bit-flag structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagStorage {
    /// `typedef enum Vk…FlagBits`
    Flags,
    /// `static const Vk…FlagBits2` pseudo-enums.
    Flags64,
}

impl FlagStorage {
    pub fn base_type(self) -> &'static str {
        match self {
            Self::Flags => "Flags",
            Self::Flags64 => "Flags64",
        }
    }

    #[inline(always)]
    pub fn width(self) -> u32 {
        match self {
            Self::Flags => 32,
            Self::Flags64 => 64,
        }
    }

    /// How the `FLAG_BITS` part of the shouty type name is rewritten to get
    /// the member prefix.
    fn prefix_rewrite(self) -> (&'static str, &'static str) {
        match self {
            Self::Flags => ("_FLAG_BITS", ""),
            Self::Flags64 => ("_FLAG_BITS2", "_2"),
        }
    }
}

/// Classification of one flag member's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    /// A single set bit, by index.
    Bit(u32),
    /// Zero; contributes no bit.
    Zero,
    /// Several set bits.
    Composite(u64),
    /// Another member of the same enum, by its normalised name.
    Alias(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagBit {
    pub name: String,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupMember {
    Named(String),
    /// A set bit that no single-bit member names.
    Unnamed(u32),
}

/// A named composite or zero value, decomposed into the bits it sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagGroup {
    pub name: String,
    pub value: u64,
    pub members: Vec<GroupMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagEnum {
    /// Binding name, `…Flags` rather than `…FlagBits`.
    pub name: String,
    pub storage: FlagStorage,
    /// In source order; aliases resolved to the bit they name.
    pub bits: Vec<FlagBit>,
    /// Computed for diagnostics only, never written out.
    pub groups: Vec<FlagGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainEnum {
    pub name: String,
    pub members: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumDef {
    Plain(PlainEnum),
    Flags(FlagEnum),
}

impl EnumDef {
    pub fn name(&self) -> &str {
        match self {
            EnumDef::Plain(e) => &e.name,
            EnumDef::Flags(e) => &e.name,
        }
    }
}

/// Member naming context shared by every member of one flag enum.
struct FlagContext<'c> {
    config: &'c BindingsConfig<'c>,
    enum_name: String,
    storage: FlagStorage,
    prefix: String,
    suffix: Option<String>,
}

impl<'c> FlagContext<'c> {
    fn new(config: &'c BindingsConfig<'c>, c_name: &str, storage: FlagStorage) -> Self {
        let shouty = c_name.shouty_snake_case();
        let (shouty, suffix) = match config.strip_vendor_suffix(&shouty) {
            Some((vendor, stripped)) => (stripped.to_string(), Some(format!("_{vendor}"))),
            None => (shouty.clone(), None),
        };
        let (from, to) = storage.prefix_rewrite();
        let prefix = format!("{}_", shouty.replace(from, to));
        FlagContext {
            config,
            enum_name: config.bits_to_flags(c_name),
            storage,
            prefix,
            suffix,
        }
    }

    fn strip_affixes<'s>(&self, s: &'s str) -> &'s str {
        let s = s.strip_prefix(self.prefix.as_str()).unwrap_or(s);
        self.suffix
            .as_deref()
            .and_then(|suffix| s.strip_suffix(suffix))
            .unwrap_or(s)
    }

    fn normalize(&self, s: &str) -> String {
        let name = s.fix_enum_arg(true, self.config.vendor_suffixes);
        let name = if name.starts_with('_') {
            format!("N{name}")
        } else {
            name
        };
        name.to_uppercase()
    }

    fn member_name(&self, member: &str) -> String {
        self.normalize(self.strip_affixes(member))
    }

    fn check_bit(&self, member: &str, index: u64) -> Result<u32, ReconstructError> {
        let width = self.storage.width();
        if index < u64::from(width) {
            Ok(index as u32)
        } else {
            Err(ReconstructError::BitOutOfRange {
                enum_name: self.enum_name.clone(),
                member: member.to_string(),
                index,
                width,
            })
        }
    }

    /// Hex literals are masks, decimal literals are bit indices, and
    /// identifiers refer to other members.
    fn classify(&self, member: &str, value: &str) -> Result<FlagValue, ReconstructError> {
        let stripped = value.strip_vk();
        let token: String = stripped.split_whitespace().collect();
        let token = self.strip_affixes(&token);
        match parse_enum_literal(token) {
            Some(EnumLiteral::Hex(0) | EnumLiteral::Decimal(0)) => Ok(FlagValue::Zero),
            Some(EnumLiteral::Hex(mask)) if mask.is_power_of_two() => {
                self.check_bit(member, mask.trailing_zeros().into()).map(FlagValue::Bit)
            },
            Some(EnumLiteral::Hex(mask)) => Ok(FlagValue::Composite(mask)),
            Some(EnumLiteral::Decimal(index)) => self.check_bit(member, index).map(FlagValue::Bit),
            Some(EnumLiteral::Ident(ident)) => Ok(FlagValue::Alias(self.normalize(ident))),
            None => Err(ReconstructError::MalformedValue {
                enum_name: self.enum_name.clone(),
                member: member.to_string(),
                value: value.to_string(),
            }),
        }
    }
}

/// Follows alias chains to the bit they end at. Chains that leave the enum,
/// end at a group, or loop yield `None`.
fn resolve_aliases(entries: Vec<(String, FlagValue)>) -> Vec<(String, Option<u32>)> {
    let by_name: HashMap<&str, &FlagValue> = entries.iter()
        .map(|(name, value)| (name.as_str(), value))
        .collect();
    entries.iter()
        .map(|(name, value)| (name.clone(), resolve_alias(&by_name, value)))
        .collect()
}

fn resolve_alias<'a>(by_name: &HashMap<&'a str, &'a FlagValue>, mut value: &'a FlagValue) -> Option<u32> {
    let mut seen = HashSet::new();
    loop {
        match value {
            FlagValue::Bit(index) => return Some(*index),
            FlagValue::Alias(target) if seen.insert(target.as_str()) => {
                value = *by_name.get(target.as_str())?;
            },
            _ => return None,
        }
    }
}

/// Rebuilds a bit-flag structure from the `(name, value)` members of a
/// `…FlagBits` enum.
pub fn reconstruct_flags(
    config: &BindingsConfig<'_>,
    c_name: &str,
    members: &[EnumMember<'_>],
    storage: FlagStorage,
) -> Result<FlagEnum, ReconstructError> {
    let cx = FlagContext::new(config, c_name, storage);
    let mut entries = Vec::new();
    let mut groups = Vec::new();
    let mut known = BTreeMap::new();
    for member in members {
        let name = cx.member_name(member.name);
        match cx.classify(member.name, member.value)? {
            FlagValue::Zero => groups.push((name, 0)),
            FlagValue::Composite(mask) => groups.push((name, mask)),
            FlagValue::Bit(index) => {
                if name == index.to_string() {
                    continue;
                }
                known.insert(index, name.clone());
                entries.push((name, FlagValue::Bit(index)));
            },
            FlagValue::Alias(target) => {
                if target == name || target == "NONE" {
                    continue;
                }
                entries.push((name, FlagValue::Alias(target)));
            },
        }
    }

    let mut resolved = resolve_aliases(entries);

    let max_bit = resolved.iter().filter_map(|(_, v)| *v).max().unwrap_or(0);
    let max_group = groups.iter().map(|&(_, v)| v).max().unwrap_or(0);
    if u64::from(max_bit) < max_group && (1u128 << max_bit) + 1 < u128::from(max_group) {
        resolved.push((MAX_SENTINEL.to_string(), Some(MAX_SENTINEL_BIT)));
        known.insert(MAX_SENTINEL_BIT, MAX_SENTINEL.to_string());
    }

    let bits = resolved.into_iter()
        .filter_map(|(name, index)| match index {
            Some(index) => Some(FlagBit { name, index }),
            None => {
                debug!("{}: ignoring {}, it does not resolve to a single bit", &cx.enum_name, &name);
                None
            },
        })
        .collect();

    let groups = groups.into_iter()
        .map(|(name, value)| {
            let members = (0..storage.width())
                .filter(|i| value & (1u64 << i) != 0)
                .map(|i| match known.get(&i) {
                    Some(flag) => GroupMember::Named(flag.clone()),
                    None => GroupMember::Unnamed(i),
                })
                .collect();
            let group = FlagGroup { name, value, members };
            debug!("{}: suppressed group {}", &cx.enum_name, &group);
            group
        })
        .collect();

    Ok(FlagEnum {
        name: cx.enum_name,
        storage,
        bits,
        groups,
    })
}

pub fn plain_enum(name: &str, members: &[EnumMember<'_>]) -> PlainEnum {
    let members = members.iter()
        .filter_map(|m| {
            let value = m.value.strip_vk();
            if m.name == value || value == "NONE" {
                return None;
            }
            let n_prefix = |s: &str| if s.starts_with('_') { format!("N{s}") } else { s.to_string() };
            let value = match parse_enum_literal(&value) {
                Some(EnumLiteral::Ident(_)) => n_prefix(&value).to_uppercase(),
                _ => value,
            };
            Some((n_prefix(m.name).to_uppercase(), value))
        })
        .collect();
    PlainEnum {
        name: name.to_string(),
        members,
    }
}

impl fmt::Display for FlagGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members = self.members.iter()
            .map(|m| match m {
                GroupMember::Named(name) => format!(".{name}"),
                GroupMember::Unnamed(i) => format!("bit({i})"),
            })
            .join(", ");
        write!(f, "{} = {{{}}}", &self.name, members)
    }
}

impl fmt::Display for FlagEnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "bitstruct {} : {} @overlap {{", &self.name, self.storage.base_type())?;
        let width = column_width(self.bits.iter().map(|b| &b.name));
        for FlagBit { name, index } in &self.bits {
            write!(f, "\tbool {:width$} : {};", name.to_lowercase(), index)?;
            if name == MAX_SENTINEL {
                f.write_str(" // Needed for the *_ALL bit set")?;
            }
            f.write_str("\n")?;
        }
        f.write_str("}\n\n")
    }
}

impl fmt::Display for PlainEnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "distinct {} = CInt;", &self.name)?;
        let width = column_width(self.members.iter().map(|(n, _)| n));
        for (name, value) in &self.members {
            writeln!(f, "const {} {:width$} = {};", &self.name, name, value)?;
        }
        f.write_str("\n")
    }
}

impl fmt::Display for EnumDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumDef::Plain(e) => e.fmt(f),
            EnumDef::Flags(e) => e.fmt(f),
        }
    }
}

/// Every `typedef enum`, sorted by binding name.
pub fn collect_enums(config: &BindingsConfig<'_>, src: &str) -> Result<Vec<EnumDef>, ReconstructError> {
    let mut decls = extract::enums(src)
        .into_iter()
        .map(|decl| (decl.name.strip_vk(), decl.body))
        .collect_vec();
    decls.sort_by(|a, b| a.0.cmp(&b.0));
    decls.into_iter()
        .map(|(name, body)| {
            let members = extract::enum_members(body);
            if name.contains(config.flag_suffixes.0) {
                reconstruct_flags(config, &name, &members, FlagStorage::Flags).map(EnumDef::Flags)
            } else {
                Ok(EnumDef::Plain(plain_enum(&name, &members)))
            }
        })
        .collect()
}

/// 64-bit flags declared as `static const` members, grouped by type and
/// sorted by type name.
pub fn collect_static_flags(config: &BindingsConfig<'_>, src: &str) -> Result<Vec<FlagEnum>, ReconstructError> {
    let mut by_type: BTreeMap<&str, Vec<EnumMember<'_>>> = BTreeMap::new();
    for flag in extract::static_flag_bits(src) {
        by_type.entry(flag.ty).or_default().push(EnumMember {
            name: flag.name,
            value: flag.value,
        });
    }
    by_type.into_iter()
        .map(|(ty, members)| reconstruct_flags(config, ty, &members, FlagStorage::Flags64))
        .collect()
}

impl PlainEnum {
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(name, _)| name.as_str())
    }
}

/// Contents of `enums.c3i` after the file preamble. `enums` is the result of
/// [`collect_enums`] over the same source.
pub fn write_enums(config: &BindingsConfig<'_>, src: &str, enums: &[EnumDef]) -> Result<String, ReconstructError> {
    let mut out = String::from("import std::core::cinterop;\nimport std::collections::bitset;\n\n// Enums\n");
    let mut generated = HashSet::new();
    for e in enums {
        if let EnumDef::Flags(flags) = e {
            generated.insert(flags.name.as_str());
        }
        out.push_str(&e.to_string());
    }

    let empty: BTreeSet<&str> = extract::flag_typedefs(src)
        .into_iter()
        .filter(|name| !generated.contains(name))
        .collect();
    let width = column_width(&empty);
    for name in &empty {
        out.push_str(&format!("bitstruct {:width$} : uint {{}}\n", name));
    }

    for flags in collect_static_flags(config, src)? {
        out.push_str(&flags.to_string());
    }
    out.push_str("\n\n");
    Ok(out)
}
