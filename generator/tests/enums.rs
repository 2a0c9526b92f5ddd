use vkc3_generator::{
    enums::{
        collect_enums,
        reconstruct_flags,
        EnumDef,
        FlagBit,
        FlagGroup,
        FlagStorage,
        GroupMember,
    },
    extract::EnumMember,
    VK_CONFIG,
};

const FIXTURE: &str = include_str!("fixtures/vulkan_mini.h");

fn members<'a>(pairs: &[(&'a str, &'a str)]) -> Vec<EnumMember<'a>> {
    pairs.iter().map(|&(name, value)| EnumMember { name, value }).collect()
}

#[test]
fn vulkan_flag_member_names_correct() {
    let m = members(&[
        ("CULL_MODE_NONE", "0"),
        ("CULL_MODE_FRONT_BIT", "0x00000001"),
        ("CULL_MODE_BACK_BIT", "0x00000002"),
        ("CULL_MODE_FRONT_AND_BACK", "0x00000003"),
    ]);
    let flags = reconstruct_flags(&VK_CONFIG, "CullModeFlagBits", &m, FlagStorage::Flags).unwrap();
    assert_eq!(flags.name, "CullModeFlags");
    assert_eq!(
        flags.bits,
        vec![
            FlagBit { name: "FRONT".into(), index: 0 },
            FlagBit { name: "BACK".into(), index: 1 },
        ]
    );
    assert_eq!(
        flags.groups,
        vec![
            FlagGroup {
                name: "NONE".into(),
                value: 0,
                members: vec![],
            },
            FlagGroup {
                name: "FRONT_AND_BACK".into(),
                value: 3,
                members: vec![
                    GroupMember::Named("FRONT".into()),
                    GroupMember::Named("BACK".into()),
                ],
            },
        ]
    );
    assert_eq!(
        flags.to_string(),
        "bitstruct CullModeFlags : Flags @overlap {\n\tbool front : 0;\n\tbool back  : 1;\n}\n\n"
    );
}

#[test]
fn fixture_enums_are_sorted_by_binding_name() {
    let enums = collect_enums(&VK_CONFIG, FIXTURE).unwrap();
    let names: Vec<&str> = enums.iter().map(EnumDef::name).collect();
    assert_eq!(names, ["CullModeFlags", "Result", "VideoH264ProfileIdc"]);
    assert!(matches!(&enums[0], EnumDef::Flags(_)));

    let EnumDef::Plain(std_enum) = &enums[2] else {
        panic!("{:?} should be a plain enum", &enums[2]);
    };
    assert_eq!(
        std_enum.member_names().collect::<Vec<_>>(),
        [
            "VIDEO_H264_PROFILE_IDC_BASELINE",
            "VIDEO_H264_PROFILE_IDC_MAIN",
            "VIDEO_H264_PROFILE_IDC_INVALID",
        ]
    );
}
