//! Second pass: reads the emitted `procedures.c3i` back and writes public
//! wrappers around the raw function pointers.

use std::collections::HashMap;
use crate::{
    procedures::Param,
    util::lines,
};

/// A `def Proc… = fn <ret>(<params>);` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureDef<'a> {
    pub return_type: &'a str,
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureDecls<'a> {
    pub defs: HashMap<&'a str, ProcedureDef<'a>>,
    /// `(type, variable)` in file order.
    pub pointers: Vec<(&'a str, &'a str)>,
}

pub fn parse_procedure_decls(code: &str) -> ProcedureDecls<'_> {
    static_regex! {
        DEF = r"^def\s+(\w+)\s*=\s*fn\s+(\w+)\((.*?)\);",
        POINTER = r"^(\w+)\s+(\w+);",
    }
    let mut defs = HashMap::new();
    let mut pointers = Vec::new();
    for line in code.lines().map(str::trim) {
        if let Some(c) = DEF.captures(line) {
            let (Some(name), Some(ret), Some(params)) = (c.get(1), c.get(2), c.get(3)) else {
                continue;
            };
            defs.insert(name.as_str(), ProcedureDef {
                return_type: ret.as_str(),
                params: Param::parse_list(params.as_str()),
            });
        } else if let Some(c) = POINTER.captures(line) {
            if let (Some(ty), Some(var)) = (c.get(1), c.get(2)) {
                pointers.push((ty.as_str(), var.as_str()));
            }
        }
    }
    ProcedureDecls { defs, pointers }
}

/// How a procedure is wrapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterKind<'p> {
    /// Ends in `T* p…Count, U* p…s`: called once for the count and once
    /// into an allocated buffer.
    Enumerate {
        base: &'p [Param],
        count_type: &'p str,
        array_type: &'p str,
    },
    PassThrough,
}

impl<'p> AdapterKind<'p> {
    pub fn classify(params: &'p [Param]) -> Self {
        let [base @ .., count, array] = params else {
            return AdapterKind::PassThrough;
        };
        let simple = |p: &Param| !p.ty.is_empty() && !p.ty.contains(char::is_whitespace);
        let named = count.name.starts_with('p')
            && count.name.ends_with("Count")
            && array.name.starts_with('p')
            && array.name.ends_with('s');
        match (count.ty.strip_suffix('*'), array.ty.strip_suffix('*')) {
            (Some(count_type), Some(array_type)) if named && simple(count) && simple(array) => {
                AdapterKind::Enumerate {
                    base,
                    count_type,
                    array_type,
                }
            },
            _ => AdapterKind::PassThrough,
        }
    }
}

fn arg_names<'p>(params: impl IntoIterator<Item = &'p Param>) -> Vec<&'p str> {
    params.into_iter().map(|p| p.name.as_str()).collect()
}

fn join_params(params: &[Param]) -> String {
    params.iter().map(Param::to_string).collect::<Vec<_>>().join(", ")
}

/// One wrapper function, without the trailing blank line.
pub fn write_adapter(result_type: &str, var_name: &str, def: &ProcedureDef<'_>) -> String {
    let returns_result = def.return_type == result_type;
    let call = |args: &[&str]| {
        let call = format!("internal::{}({})", var_name, args.join(", "));
        if returns_result {
            format!("\tvk::check({call})!;")
        } else {
            format!("\t{call};")
        }
    };
    let mut out = Vec::new();
    match AdapterKind::classify(&def.params) {
        AdapterKind::Enumerate { base, count_type, array_type } => {
            let bang = if returns_result { "!" } else { "" };
            out.push(format!("fn {}[]{} {}({}) {{", array_type, bang, var_name, join_params(base)));
            out.push(format!("\t{count_type} n;"));
            let mut args = arg_names(base);
            args.extend(["&n", "null"]);
            out.push(call(&args));
            out.push(format!("\t{array_type}* ret = ({array_type}*) malloc(n * {array_type}.sizeof);"));
            args.pop();
            args.push("ret");
            out.push(call(&args));
            out.push("\treturn ret[:n];".to_string());
        },
        AdapterKind::PassThrough => {
            let params = join_params(&def.params);
            let args = arg_names(&def.params);
            if returns_result {
                out.push(format!("fn void! {var_name}({params}) {{"));
                out.push(call(&args));
            } else if def.return_type == "void" {
                out.push(format!("fn void {var_name}({params}) {{"));
                out.push(call(&args));
            } else {
                out.push(format!("fn {} {var_name}({params}) {{", def.return_type));
                out.push(format!("\treturn internal::{}({});", var_name, args.join(", ")));
            }
        },
    }
    out.push("}".to_string());
    out.join("\n")
}

/// One wrapper per pointer declaration whose type is defined, in file order.
pub fn adapters(result_type: &str, decls: &ProcedureDecls<'_>) -> Vec<String> {
    decls.pointers
        .iter()
        .filter_map(|(ty, var)| match decls.defs.get(ty) {
            Some(def) => Some(write_adapter(result_type, var, def)),
            None => {
                debug!("no procedure type {} for {}, skipping", ty, var);
                None
            },
        })
        .collect()
}

/// Contents of `public-procedures.c3`.
pub fn write_adapters(module_name: &str, result_type: &str, procedures: &str) -> String {
    let decls = parse_procedure_decls(procedures);
    let wrappers = adapters(result_type, &decls);
    trace!("wrote {} adapters", wrappers.len());
    let mut out = vec![format!("module {module_name};"), "import std::core::cinterop;".to_string(), String::new()];
    for wrapper in wrappers {
        out.push(wrapper);
        out.push(String::new());
    }
    lines(out).trim_end_matches('\n').to_string() + "\n"
}
