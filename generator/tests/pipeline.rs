use std::{
    fs,
    path::{Path, PathBuf},
};
use vkc3_generator::{
    generate,
    write_adapters,
    write_source_code,
    ADAPTERS_FILE,
    CORE_FILE,
    ENUMS_FILE,
    LOADER_FILE,
    PROCEDURES_FILE,
    STRUCTS_FILE,
    VK_CONFIG,
};

const FIXTURE: &str = include_str!("fixtures/vulkan_mini.h");

const FILE_HEADER: &str = "//\n\
    // Vulkan wrapper generated from \"https://raw.githubusercontent.com/KhronosGroup/Vulkan-Headers/main/include/vulkan/vulkan_core.h\"\n\
    //\n\
    module vk;\n";

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("vkc3-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// A header cache holding the fixture as `vulkan_core.h` and every other
/// configured header empty, so nothing is fetched.
fn header_cache(dir: &Path) {
    for header in VK_CONFIG.headers {
        let text = if header.file == "vulkan_core.h" { FIXTURE } else { "" };
        fs::write(dir.join(header.file), text).unwrap();
    }
}

#[test]
fn every_file_starts_with_the_header() {
    let files = generate(&VK_CONFIG, FIXTURE).unwrap();
    for (name, contents) in files.files() {
        assert!(contents.starts_with(FILE_HEADER), "{name}");
    }
}

#[test]
fn core_constants_and_handles() {
    let core = generate(&VK_CONFIG, FIXTURE).unwrap().core;
    assert!(core.contains("// General Constants\nconst HEADER_VERSION       = 303;\nconst MAX_DRIVER_NAME_SIZE = 256;\n"));
    assert!(core.contains("// Vulkan Video Constants\nconst VIDEO_H264_CPB_CNT_LIST_SIZE = 32;\n"));
    assert!(core.contains(
        "// Vulkan Video Codec Constants\n\
         const VULKAN_VIDEO_CODEC_H264_DECODE_EXTENSION_NAME = \"VK_STD_vulkan_video_codec_h264_decode\";\n"
    ));
    assert!(core.contains("const KHR_GET_PHYSICAL_DEVICE_PROPERTIES2 = 1;\n"));
    assert!(core.lines().any(|l| l.starts_with("const KHR_SURFACE_EXTENSION_NAME ") && l.ends_with("= \"VK_KHR_surface\";")));
    assert!(core.contains("// Handles types\n"));
    assert!(core.contains("distinct PhysicalDevice = Handle;\n"));
    assert!(core.contains("distinct Instance       = Handle;\n"));
    assert!(core.contains("distinct SurfaceKHR = NonDispatchableHandle;\n"));
    assert!(core.ends_with("\n\n"));
}

#[test]
fn enums_file_layout() {
    let enums = generate(&VK_CONFIG, FIXTURE).unwrap().enums;
    let body = enums.strip_prefix(FILE_HEADER).unwrap();
    assert!(body.starts_with("\nimport std::core::cinterop;\nimport std::collections::bitset;\n\n// Enums\n"));
    assert!(body.contains("bitstruct CullModeFlags : Flags @overlap {\n\tbool front : 0;\n\tbool back  : 1;\n}\n\n"));
    assert!(body.contains("const Result ERROR_OUT_OF_HOST_MEMORY = -1;\n"));
    assert!(body.contains("distinct VideoH264ProfileIdc = CInt;\n"));
    assert!(body.contains("bitstruct InstanceCreateFlags : uint {}\n"));
    assert!(body.contains("bitstruct PipelineStageFlags2 : Flags64 @overlap {\n"));
    assert!(!body.contains("FRONT_AND_BACK"));
    assert!(body.ends_with("\n\n"));
}

#[test]
fn structs_keep_array_fields() {
    let structs = generate(&VK_CONFIG, FIXTURE).unwrap().structs;
    assert!(structs.contains("struct PipelineColorBlendStateCreateInfo {\n"));
    assert!(structs.lines().any(|l| {
        l.trim_start().starts_with("float[4]") && l.ends_with(" blendConstants;")
    }));
    let vk = structs.find("struct PipelineColorBlendStateCreateInfo").unwrap();
    let std = structs.find("struct VideoH264SpsVuiFlags {\n").unwrap();
    assert!(vk < std);
    assert!(structs.lines().any(|l| {
        l.contains("aspect_ratio_info_present_flag;") && l.ends_with("// TODO: Make this field 1 bit width")
    }));
    assert!(structs.contains("// Opaque structs\n"));
    assert!(structs.contains("// Aliases\ndef PhysicalDeviceFeatures2KHR = PhysicalDeviceFeatures2;\n"));
    for line in structs.lines() {
        assert_eq!(line, line.trim_end());
    }
}

#[test]
fn procedures_are_grouped_by_dispatch() {
    let files = generate(&VK_CONFIG, FIXTURE).unwrap();
    let procedures = &files.procedures;
    assert!(procedures.contains(
        "// Loader Procedure Types\n\
         def ProcCreateInstance      = fn Result(InstanceCreateInfo* pCreateInfo, AllocationCallbacks* pAllocator, Instance* pInstance);\n\
         def ProcGetInstanceProcAddr = fn ProcVoidFunction(Instance instance, ZString pName);\n"
    ));
    assert!(procedures.contains("// Misc Procedure Types\ndef ProcVoidFunction = fn void();\n"));
    assert!(procedures.contains(
        "def ProcCmdSetBlendConstants = fn void(CommandBuffer commandBuffer, float[4]* blendConstants);\n"
    ));
    assert!(procedures.contains("// Instance Procedures\nProcEnumeratePhysicalDevices enumeratePhysicalDevices;\n"));
    assert!(!procedures.contains("// Misc Procedures\n"));
    assert!(!procedures.contains(" voidFunction;"));

    let loader = &files.function_loader;
    assert!(loader.contains("fn void loadProcAddressesGlobal(void* vkGetInstanceProcAddr) {\n\tgetInstanceProcAddr = vkGetInstanceProcAddr;\n\n"));
    assert!(loader.contains("(ProcEnumeratePhysicalDevices) getInstanceProcAddr(instance, \"vkEnumeratePhysicalDevices\");\n"));
    assert!(loader.contains("(ProcDestroyDevice) getDeviceProcAddr(device, \"vkDestroyDevice\");\n"));
    assert!(!loader.contains("vkVoidFunction"));
}

#[test]
fn regeneration_is_byte_identical() {
    let headers = scratch_dir("headers");
    header_cache(&headers);
    let first = scratch_dir("first");
    let second = scratch_dir("second");
    for out in [&first, &second] {
        write_source_code(&VK_CONFIG, &headers, out).unwrap();
        write_adapters(&VK_CONFIG, out).unwrap();
    }
    for name in [CORE_FILE, ENUMS_FILE, STRUCTS_FILE, PROCEDURES_FILE, LOADER_FILE, ADAPTERS_FILE] {
        let a = fs::read(first.join(name)).unwrap();
        let b = fs::read(second.join(name)).unwrap();
        assert!(!a.is_empty(), "{name}");
        assert_eq!(a, b, "{name}");
    }
    let in_memory = generate(&VK_CONFIG, FIXTURE).unwrap();
    assert_eq!(fs::read_to_string(first.join(ENUMS_FILE)).unwrap(), in_memory.enums);

    for dir in [headers, first, second] {
        let _ = fs::remove_dir_all(dir);
    }
}
