use itertools::Itertools;
use crate::{
    config::BindingsConfig,
    ctype::binding_type,
    extract::{self, FieldDecl, StructDecl},
    util::{column_width, lines, NameExt},
    GeneratorError,
};

pub const STRUCTS_PREAMBLE: &str = include_str!("../templates/structs.c3i");
pub const OPAQUE_STRUCTS: &str = include_str!("../templates/opaque_structs.c3i");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub ty: String,
    pub name: String,
    /// Width of a C bit-field, which is transcribed as a plain field.
    pub bit_width: Option<String>,
}

impl Field {
    fn from_decl(config: &BindingsConfig<'_>, owner: &str, decl: &FieldDecl<'_>) -> Result<Option<Self>, GeneratorError> {
        if decl.name.is_int() {
            // `uint32_t flag : 1;` is matched as type `uint32_t flag`, name `1`
            let (ty, name) = decl.ty
                .split_whitespace()
                .collect_tuple()
                .ok_or_else(|| GeneratorError::MalformedDeclaration {
                    name: owner.to_string(),
                    text: format!("{} : {}", decl.ty, decl.name),
                })?;
            return Ok(Some(Field {
                ty: binding_type(config, ty),
                name: field_name(name),
                bit_width: Some(decl.name.to_string()),
            }));
        }
        if decl.ty.contains("Flag_Bits") {
            return Ok(None);
        }
        let (name, ty) = match decl.name.split_once('[') {
            Some((name, len)) => {
                let len = len.strip_suffix(']').unwrap_or(len).strip_vk();
                (name, format!("{}[{}]", binding_type(config, decl.ty), len))
            },
            None => (decl.name, binding_type(config, decl.ty)),
        };
        Ok(Some(Field {
            ty,
            name: field_name(&name.fix_arg()),
            bit_width: None,
        }))
    }
}

fn field_name(name: &str) -> String {
    let mut chars = name.chars();
    let mut name: String = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    };
    if name == "module" {
        name.push('_');
    }
    name
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    pub keyword: &'static str,
    pub name: String,
    pub fields: Vec<Field>,
}

impl StructDef {
    pub fn from_decl(config: &BindingsConfig<'_>, decl: &StructDecl<'_>) -> Result<Self, GeneratorError> {
        let mut fields = Vec::new();
        for field in extract::struct_fields(decl.body) {
            if let Some(field) = Field::from_decl(config, decl.name, &field)? {
                fields.push(field);
            }
        }
        Ok(StructDef {
            keyword: decl.kind.keyword(),
            name: decl.name.to_string(),
            fields,
        })
    }

    pub fn to_c3(&self) -> String {
        let ty_width = column_width(self.fields.iter().map(|f| &f.ty));
        let name_width = column_width(self.fields.iter().map(|f| &f.name));
        let body = lines(self.fields.iter().map(|f| {
            let comment = f.bit_width
                .as_ref()
                .map(|w| format!(" // TODO: Make this field {w} bit width"))
                .unwrap_or_default();
            format!("\t{:ty_width$} {:name_width$}; {}", &f.ty, &f.name, comment)
                .trim_end()
                .to_string()
        }));
        format!("{} {} {{\n{}}}\n\n", self.keyword, &self.name, body)
    }
}

/// `typedef Vk<target> Vk<name>;` pairs, minus flag typedefs, as
/// `(name, target)`.
pub fn type_aliases(src: &str) -> Vec<(String, &str)> {
    extract::type_aliases(src)
        .into_iter()
        .filter(|&(target, name)| {
            target != "Flags"
                && !target.contains("FlagBits")
                && !name.ends_with("Flag2")
                && !name.ends_with("Flags2")
        })
        .map(|(target, name)| (name.replace("FlagBits", "Flag"), target))
        .collect()
}

/// Contents of `structs.c3i` after the platform preamble.
pub fn write_structs(config: &BindingsConfig<'_>, src: &str) -> Result<String, GeneratorError> {
    let mut out = String::new();
    for decl in extract::structs(src) {
        out.push_str(&StructDef::from_decl(config, &decl)?.to_c3());
    }
    out.push_str("// Opaque structs\n");
    out.push_str(OPAQUE_STRUCTS);

    let aliases = type_aliases(src);
    let width = column_width(aliases.iter().map(|(n, _)| n));
    out.push_str("// Aliases\n");
    out.push_str(&lines(aliases.iter().map(|(name, target)| format!("def {:width$} = {};", name, target))));
    Ok(out)
}
