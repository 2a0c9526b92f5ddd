use std::{
    collections::BTreeMap,
    fmt,
};
use itertools::Itertools;
use crate::{
    config::{BindingsConfig, DispatchGroup},
    ctype::{binding_type, parse_c_parameters},
    extract::{self, ProcTypedef},
    util::{column_width, lines, NameExt},
    GeneratorError,
};

/// One formal parameter, already in binding syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub ty: String,
    pub name: String,
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", &self.ty, &self.name)
    }
}

impl Param {
    /// Parses a parameter list as written by [`ProcedureSignature::params_c3`].
    /// Procedure declarations are read back by the adapter pass with this, so
    /// the two must agree.
    pub fn parse_list(list: &str) -> Vec<Param> {
        if list.trim().is_empty() {
            return Vec::new();
        }
        list.split(',')
            .map(str::trim)
            .map(|p| match p.rsplit_once(char::is_whitespace) {
                Some((ty, name)) => Param {
                    ty: ty.trim().to_string(),
                    name: name.to_string(),
                },
                None => Param {
                    ty: String::new(),
                    name: p.to_string(),
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureSignature {
    /// `PFN_vkCreateInstance`
    pub c_name: String,
    /// `ProcCreateInstance`
    pub name: String,
    /// `vkCreateInstance`, the name the loader looks up.
    pub symbol: String,
    pub return_type: String,
    pub params: Vec<Param>,
    pub group: DispatchGroup,
}

impl ProcedureSignature {
    pub fn from_typedef(config: &BindingsConfig<'_>, decl: &ProcTypedef<'_>) -> Result<Self, GeneratorError> {
        let c_params = parse_c_parameters(decl.params).ok_or_else(|| GeneratorError::MalformedDeclaration {
            name: decl.name.to_string(),
            text: decl.params.to_string(),
        })?;
        let name = decl.name.strip_vk();
        let first_param = c_params.first().map(|p| binding_type(config, p.ty));
        let group = config.functions.dispatch_group(&name, first_param.as_deref());
        let params = c_params.iter()
            .map(|p| {
                let ty = binding_type(config, p.ty);
                let ty = match p.array_len {
                    Some(len) => format!("{}[{}]*", ty, len.strip_vk()),
                    None => ty,
                };
                Param {
                    ty,
                    name: p.name.fix_arg(),
                }
            })
            .filter(|p| !p.ty.is_empty())
            .collect();
        let fixed = name.fix_ext_suffix(config.vendor_suffixes);
        let symbol = format!("vk{}", fixed.strip_prefix("Proc").unwrap_or(&fixed));
        Ok(ProcedureSignature {
            c_name: decl.name.to_string(),
            return_type: binding_type(config, decl.return_type),
            name,
            symbol,
            params,
            group,
        })
    }

    /// `createInstance`
    #[inline]
    pub fn var_name(&self) -> String {
        self.name.proc_var_name()
    }

    pub fn params_c3(&self) -> String {
        self.params.iter().join(", ")
    }
}

pub fn collect_procedures(config: &BindingsConfig<'_>, src: &str) -> Result<Vec<ProcedureSignature>, GeneratorError> {
    extract::proc_typedefs(src)
        .iter()
        .map(|decl| ProcedureSignature::from_typedef(config, decl))
        .collect()
}

fn by_group<'a, K: Ord>(
    procs: &'a [ProcedureSignature],
    key: impl Fn(&ProcedureSignature) -> K,
) -> BTreeMap<DispatchGroup, Vec<&'a ProcedureSignature>> {
    let mut groups: BTreeMap<_, Vec<_>> = DispatchGroup::ALL.iter().map(|&g| (g, Vec::new())).collect();
    for p in procs {
        groups.entry(p.group).or_default().push(p);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|p| key(p));
    }
    groups
}

/// Contents of `procedures.c3i` after the file preamble: the function types
/// of every group, then a function pointer variable for each loaded one.
pub fn write_procedures(procs: &[ProcedureSignature]) -> String {
    let mut out = String::from("import std::core::cinterop;\n\n");
    let types = by_group(procs, |p| p.c_name.clone());
    for group in DispatchGroup::ALL {
        let ps = &types[&group];
        let width = column_width(ps.iter().map(|p| &p.name));
        out.push_str(&format!("// {group} Procedure Types\n"));
        out.push_str(&lines(ps.iter().map(|p| {
            format!("def {:width$} = fn {}({});", &p.name, &p.return_type, p.params_c3())
        })));
        out.push('\n');
    }

    let vars = by_group(procs, |p| p.name.clone());
    for group in DispatchGroup::LOADED {
        let ps = &vars[&group];
        let width = column_width(ps.iter().map(|p| &p.name));
        out.push_str(&format!("// {group} Procedures\n"));
        out.push_str(&lines(ps.iter().map(|p| format!("{:width$} {};", &p.name, p.var_name()))));
        out.push('\n');
    }
    out.push('\n');
    out
}

fn load_lines(procs: &[&ProcedureSignature], getter: &str, handle: &str) -> String {
    let vars = procs.iter().map(|p| p.var_name()).collect_vec();
    let width = column_width(&vars);
    lines(procs.iter().zip(&vars).map(|(p, var)| {
        format!("\t{:width$} = ({}) {}({}, \"{}\");", var, &p.name, getter, handle, &p.symbol)
    }))
}

/// Contents of `function-loader.c3` after the file preamble.
pub fn write_loader(procs: &[ProcedureSignature]) -> String {
    let groups = by_group(procs, |p| p.name.clone());
    let loader = &groups[&DispatchGroup::Loader];
    let instance = &groups[&DispatchGroup::Instance];
    let device = &groups[&DispatchGroup::Device];

    let mut out = String::from("fn void loadProcAddressesCustom(SetProcAddressFnType setProcAddr) {\n");
    for group in DispatchGroup::LOADED {
        let ps = &groups[&group];
        let vars = ps.iter().map(|p| p.var_name()).collect_vec();
        let width = column_width(&vars);
        out.push_str(&format!("\t// {group} Procedures\n"));
        out.push_str(&lines(ps.iter().zip(&vars).map(|(p, var)| {
            format!("\tsetProcAddr(&{}, {}\"{}\");", var, " ".repeat(width - var.len()), &p.symbol)
        })));
        out.push('\n');
    }
    out.push_str("}\n\n");

    out.push_str("fn void loadProcAddressesDevice(Device device) {\n");
    out.push_str(&load_lines(device, "getDeviceProcAddr", "device"));
    out.push_str("}\n\n");

    out.push_str("fn void loadProcAddressesInstance(Instance instance) {\n");
    out.push_str(&load_lines(instance, "getInstanceProcAddr", "instance"));
    out.push_str("\n\t// Device Procedures (may call into dispatch)\n");
    out.push_str(&load_lines(device, "getInstanceProcAddr", "instance"));
    out.push_str("}\n\n");

    out.push_str("fn void loadProcAddressesGlobal(void* vkGetInstanceProcAddr) {\n");
    out.push_str("\tgetInstanceProcAddr = vkGetInstanceProcAddr;\n\n");
    out.push_str(&load_lines(loader, "getInstanceProcAddr", "null"));
    out.push_str("}\n\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VK_CONFIG;

    const SRC: &str = "
typedef void (VKAPI_PTR *PFN_vkVoidFunction)(void);
typedef void* (VKAPI_PTR *PFN_vkAllocationFunction)(
    void*                                       pUserData,
    size_t                                      size,
    size_t                                      alignment,
    VkSystemAllocationScope                     allocationScope);
typedef VkResult (VKAPI_PTR *PFN_vkCreateInstance)(const VkInstanceCreateInfo* pCreateInfo, const VkAllocationCallbacks* pAllocator, VkInstance* pInstance);
typedef PFN_vkVoidFunction (VKAPI_PTR *PFN_vkGetInstanceProcAddr)(VkInstance instance, const char* pName);
typedef PFN_vkVoidFunction (VKAPI_PTR *PFN_vkGetDeviceProcAddr)(VkDevice device, const char* pName);
typedef VkResult (VKAPI_PTR *PFN_vkEnumeratePhysicalDevices)(VkInstance instance, uint32_t* pPhysicalDeviceCount, VkPhysicalDevice* pPhysicalDevices);
typedef void (VKAPI_PTR *PFN_vkCmdSetBlendConstants)(VkCommandBuffer commandBuffer, const float blendConstants[4]);
";

    fn procs() -> Vec<ProcedureSignature> {
        collect_procedures(&VK_CONFIG, SRC).unwrap()
    }

    fn find<'a>(procs: &'a [ProcedureSignature], name: &str) -> &'a ProcedureSignature {
        procs.iter().find(|p| p.name == name).unwrap()
    }

    #[test]
    fn signatures_are_converted() {
        let procs = procs();
        let create = find(&procs, "ProcCreateInstance");
        assert_eq!(create.return_type, "Result");
        assert_eq!(create.symbol, "vkCreateInstance");
        assert_eq!(
            create.params_c3(),
            "InstanceCreateInfo* pCreateInfo, AllocationCallbacks* pAllocator, Instance* pInstance"
        );
        let alloc = find(&procs, "ProcAllocationFunction");
        assert_eq!(alloc.return_type, "any");
        assert_eq!(alloc.params[1], Param { ty: "usz".into(), name: "size".into() });
        let blend = find(&procs, "ProcCmdSetBlendConstants");
        assert_eq!(blend.params_c3(), "CommandBuffer commandBuffer, float[4]* blendConstants");
    }

    #[test]
    fn procedures_are_grouped_by_dispatch_level() {
        let procs = procs();
        let group = |name| find(&procs, name).group;
        assert_eq!(group("ProcVoidFunction"), DispatchGroup::Misc);
        assert_eq!(group("ProcAllocationFunction"), DispatchGroup::Loader);
        assert_eq!(group("ProcCreateInstance"), DispatchGroup::Loader);
        assert_eq!(group("ProcGetInstanceProcAddr"), DispatchGroup::Loader);
        assert_eq!(group("ProcGetDeviceProcAddr"), DispatchGroup::Instance);
        assert_eq!(group("ProcEnumeratePhysicalDevices"), DispatchGroup::Instance);
        assert_eq!(group("ProcCmdSetBlendConstants"), DispatchGroup::Device);
    }

    #[test]
    fn declarations_round_trip_through_param_parser() {
        for p in procs() {
            assert_eq!(Param::parse_list(&p.params_c3()), p.params, "{}", &p.name);
        }
    }

    #[test]
    fn writes_declarations() {
        let out = write_procedures(&procs());
        assert!(out.starts_with("import std::core::cinterop;\n\n// Loader Procedure Types\n"));
        assert!(out.contains(
            "// Loader Procedure Types\n\
             def ProcAllocationFunction  = fn any(any pUserData, usz size, usz alignment, SystemAllocationScope allocationScope);\n"
        ));
        assert!(out.contains("// Misc Procedure Types\ndef ProcVoidFunction = fn void();\n\n"));
        assert!(out.contains("ProcAllocationFunction  allocationFunction;\n"));
        assert!(out.contains(
            "// Instance Procedures\n\
             ProcEnumeratePhysicalDevices enumeratePhysicalDevices;\n\
             ProcGetDeviceProcAddr        getDeviceProcAddr;\n\n"
        ));
        assert!(!out.contains("voidFunction;"));
    }

    #[test]
    fn writes_loader() {
        let out = write_loader(&procs());
        assert!(out.contains("\tsetProcAddr(&createInstance,      \"vkCreateInstance\");\n"));
        assert!(out.contains(
            "fn void loadProcAddressesDevice(Device device) {\n\
             \tcmdSetBlendConstants = (ProcCmdSetBlendConstants) getDeviceProcAddr(device, \"vkCmdSetBlendConstants\");\n\
             }\n"
        ));
        assert!(out.contains("\tgetInstanceProcAddr = (ProcGetInstanceProcAddr) getInstanceProcAddr(null, \"vkGetInstanceProcAddr\");\n"));
        assert!(out.contains(
            "\t// Device Procedures (may call into dispatch)\n\
             \tcmdSetBlendConstants = (ProcCmdSetBlendConstants) getInstanceProcAddr(instance, \"vkCmdSetBlendConstants\");\n"
        ));
    }
}
