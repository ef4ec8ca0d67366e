use std::fmt::Write;

use chrono::{DateTime, Datelike, Local, Timelike};

use super::format::quote_safe;
use super::Err;

/// Number of object blocks of each type written during a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ObjectCounts {
    pub models: usize,
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
}

impl ObjectCounts {
    /// Total number of objects, the implicit global settings object included.
    pub fn total(&self) -> usize {
        1 + self.models + self.geometries + self.materials + self.textures
    }
}

/// Metadata substituted into the header.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub url: String,
    pub creator: String,
    pub timestamp: DateTime<Local>,
}

impl DocumentInfo {
    /// Document info stamped with the current local time.
    pub fn new(url: &str, creator: &str) -> Self {
        Self {
            url: url.to_string(),
            creator: creator.to_string(),
            timestamp: Local::now(),
        }
    }
}

/// Wraps the `Objects` and `Connections` contents into a complete document.
pub fn assemble(objects: &str, connections: &str, counts: &ObjectCounts, info: &DocumentInfo) -> Result<String, Err> {
    let mut out = String::with_capacity(objects.len() + connections.len() + 16 * 1024);

    writeln!(out, "; FBX 7.3.0 project file")?;
    writeln!(out, "; ----------------------------------------------------")?;
    writeln!(out)?;

    write_header_extension(&mut out, info)?;
    write_global_settings(&mut out)?;
    write_definitions(&mut out, counts)?;

    writeln!(out, "; Object properties")?;
    writeln!(out, ";------------------------------------------------------------------")?;
    writeln!(out)?;
    writeln!(out, "Objects:  {{")?;
    out.push_str(objects);
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "; Object connections")?;
    writeln!(out, ";------------------------------------------------------------------")?;
    writeln!(out)?;
    writeln!(out, "Connections:  {{")?;
    writeln!(out, "\t")?;
    out.push_str(connections);
    writeln!(out, "}}")?;

    Ok(out)
}

fn write_header_extension(out: &mut String, info: &DocumentInfo) -> Result<(), Err> {
    let ts = &info.timestamp;
    writeln!(out, "FBXHeaderExtension:  {{")?;
    writeln!(out, "\tFBXHeaderVersion: 1003")?;
    writeln!(out, "\tFBXVersion: 7300")?;
    writeln!(out, "\tCreationTimeStamp:  {{")?;
    writeln!(out, "\t\tVersion: 1000")?;
    writeln!(out, "\t\tYear: {}", ts.year())?;
    writeln!(out, "\t\tMonth: {}", ts.month())?;
    writeln!(out, "\t\tDay: {}", ts.day())?;
    writeln!(out, "\t\tHour: {}", ts.hour())?;
    writeln!(out, "\t\tMinute: {}", ts.minute())?;
    writeln!(out, "\t\tSecond: {}", ts.second())?;
    writeln!(out, "\t\tMillisecond: {}", ts.timestamp_subsec_millis())?;
    writeln!(out, "\t}}")?;
    writeln!(out, "\tCreator: \"{}\"", quote_safe(&info.creator))?;
    writeln!(out, "\tSceneInfo: \"SceneInfo::GlobalInfo\", \"UserData\" {{")?;
    writeln!(out, "\t\tType: \"UserData\"")?;
    writeln!(out, "\t\tVersion: 100")?;
    writeln!(out, "\t\tMetaData:  {{")?;
    writeln!(out, "\t\t\tVersion: 100")?;
    for field in ["Title", "Subject", "Author", "Keywords", "Revision", "Comment"] {
        writeln!(out, "\t\t\t{}: \"\"", field)?;
    }
    writeln!(out, "\t\t}}")?;
    writeln!(out, "\t\tProperties70:  {{")?;
    let url = quote_safe(&info.url);
    writeln!(out, "\t\t\tP: \"DocumentUrl\", \"KString\", \"Url\", \"\", \"{}\"", url)?;
    writeln!(out, "\t\t\tP: \"SrcDocumentUrl\", \"KString\", \"Url\", \"\", \"{}\"", url)?;
    for group in ["Original", "LastSaved"] {
        writeln!(out, "\t\t\tP: \"{}\", \"Compound\", \"\", \"\"", group)?;
        for field in ["ApplicationVendor", "ApplicationName", "ApplicationVersion"] {
            writeln!(out, "\t\t\tP: \"{}|{}\", \"KString\", \"\", \"\", \"\"", group, field)?;
        }
        writeln!(out, "\t\t\tP: \"{}|DateTime_GMT\", \"DateTime\", \"\", \"\", \"\"", group)?;
        if group == "Original" {
            writeln!(out, "\t\t\tP: \"Original|FileName\", \"KString\", \"\", \"\", \"\"")?;
        }
    }
    writeln!(out, "\t\t}}")?;
    writeln!(out, "\t}}")?;
    writeln!(out, "}}")?;
    Ok(())
}

// Y up, Z front, X as coordinate axis; one unit is a meter.
fn write_global_settings(out: &mut String) -> Result<(), Err> {
    writeln!(out, "GlobalSettings:  {{")?;
    writeln!(out, "\tVersion: 1000")?;
    writeln!(out, "\tProperties70:  {{")?;
    for (name, value) in [
        ("UpAxis", 1), ("UpAxisSign", 1),
        ("FrontAxis", 2), ("FrontAxisSign", 1),
        ("CoordAxis", 0), ("CoordAxisSign", 1),
        ("OriginalUpAxis", -1), ("OriginalUpAxisSign", 1),
    ] {
        writeln!(out, "\t\tP: \"{}\", \"int\", \"Integer\", \"\",{}", name, value)?;
    }
    writeln!(out, "\t\tP: \"UnitScaleFactor\", \"double\", \"Number\", \"\",100")?;
    writeln!(out, "\t\tP: \"OriginalUnitScaleFactor\", \"double\", \"Number\", \"\",100")?;
    writeln!(out, "\t\tP: \"AmbientColor\", \"ColorRGB\", \"Color\", \"\",0,0,0")?;
    writeln!(out, "\t\tP: \"DefaultCamera\", \"KString\", \"\", \"\", \"Producer Perspective\"")?;
    writeln!(out, "\t\tP: \"TimeMode\", \"enum\", \"\", \"\",11")?;
    writeln!(out, "\t\tP: \"TimeSpanStart\", \"KTime\", \"Time\", \"\",0")?;
    writeln!(out, "\t\tP: \"TimeSpanStop\", \"KTime\", \"Time\", \"\",479181389250")?;
    writeln!(out, "\t\tP: \"CustomFrameRate\", \"double\", \"Number\", \"\",-1")?;
    writeln!(out, "\t}}")?;
    writeln!(out, "}}")?;
    Ok(())
}

fn write_definitions(out: &mut String, counts: &ObjectCounts) -> Result<(), Err> {
    writeln!(out, "; Object definitions")?;
    writeln!(out, ";------------------------------------------------------------------")?;
    writeln!(out)?;
    writeln!(out, "Definitions:  {{")?;
    writeln!(out, "\tVersion: 100")?;
    writeln!(out, "\tCount: {}", counts.total())?;

    writeln!(out, "\tObjectType: \"GlobalSettings\" {{")?;
    writeln!(out, "\t\tCount: 1")?;
    writeln!(out, "\t}}")?;

    write_object_type(out, "Model", counts.models, "FbxNode", MODEL_TEMPLATE)?;
    if counts.geometries > 0 {
        write_object_type(out, "Geometry", counts.geometries, "FbxMesh", GEOMETRY_TEMPLATE)?;
    }
    if counts.materials > 0 {
        write_object_type(out, "Material", counts.materials, "FbxSurfacePhong", MATERIAL_TEMPLATE)?;
    }
    if counts.textures > 0 {
        write_object_type(out, "Texture", counts.textures, "FbxFileTexture", TEXTURE_TEMPLATE)?;
    }

    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

fn write_object_type(out: &mut String, ty: &str, count: usize, template: &str, properties: &[&str]) -> Result<(), Err> {
    writeln!(out, "\tObjectType: \"{}\" {{", ty)?;
    writeln!(out, "\t\tCount: {}", count)?;
    writeln!(out, "\t\tPropertyTemplate: \"{}\" {{", template)?;
    writeln!(out, "\t\t\tProperties70:  {{")?;
    for p in properties {
        writeln!(out, "\t\t\t\tP: {}", p)?;
    }
    writeln!(out, "\t\t\t}}")?;
    writeln!(out, "\t\t}}")?;
    writeln!(out, "\t}}")?;
    Ok(())
}

const MODEL_TEMPLATE: &[&str] = &[
    r#""QuaternionInterpolate", "enum", "", "",0"#,
    r#""RotationOffset", "Vector3D", "Vector", "",0,0,0"#,
    r#""RotationPivot", "Vector3D", "Vector", "",0,0,0"#,
    r#""ScalingOffset", "Vector3D", "Vector", "",0,0,0"#,
    r#""ScalingPivot", "Vector3D", "Vector", "",0,0,0"#,
    r#""TranslationActive", "bool", "", "",0"#,
    r#""TranslationMin", "Vector3D", "Vector", "",0,0,0"#,
    r#""TranslationMax", "Vector3D", "Vector", "",0,0,0"#,
    r#""TranslationMinX", "bool", "", "",0"#,
    r#""TranslationMinY", "bool", "", "",0"#,
    r#""TranslationMinZ", "bool", "", "",0"#,
    r#""TranslationMaxX", "bool", "", "",0"#,
    r#""TranslationMaxY", "bool", "", "",0"#,
    r#""TranslationMaxZ", "bool", "", "",0"#,
    r#""RotationOrder", "enum", "", "",0"#,
    r#""RotationSpaceForLimitOnly", "bool", "", "",0"#,
    r#""RotationStiffnessX", "double", "Number", "",0"#,
    r#""RotationStiffnessY", "double", "Number", "",0"#,
    r#""RotationStiffnessZ", "double", "Number", "",0"#,
    r#""AxisLen", "double", "Number", "",10"#,
    r#""PreRotation", "Vector3D", "Vector", "",0,0,0"#,
    r#""PostRotation", "Vector3D", "Vector", "",0,0,0"#,
    r#""RotationActive", "bool", "", "",0"#,
    r#""RotationMin", "Vector3D", "Vector", "",0,0,0"#,
    r#""RotationMax", "Vector3D", "Vector", "",0,0,0"#,
    r#""RotationMinX", "bool", "", "",0"#,
    r#""RotationMinY", "bool", "", "",0"#,
    r#""RotationMinZ", "bool", "", "",0"#,
    r#""RotationMaxX", "bool", "", "",0"#,
    r#""RotationMaxY", "bool", "", "",0"#,
    r#""RotationMaxZ", "bool", "", "",0"#,
    r#""InheritType", "enum", "", "",0"#,
    r#""ScalingActive", "bool", "", "",0"#,
    r#""ScalingMin", "Vector3D", "Vector", "",0,0,0"#,
    r#""ScalingMax", "Vector3D", "Vector", "",1,1,1"#,
    r#""ScalingMinX", "bool", "", "",0"#,
    r#""ScalingMinY", "bool", "", "",0"#,
    r#""ScalingMinZ", "bool", "", "",0"#,
    r#""ScalingMaxX", "bool", "", "",0"#,
    r#""ScalingMaxY", "bool", "", "",0"#,
    r#""ScalingMaxZ", "bool", "", "",0"#,
    r#""GeometricTranslation", "Vector3D", "Vector", "",0,0,0"#,
    r#""GeometricRotation", "Vector3D", "Vector", "",0,0,0"#,
    r#""GeometricScaling", "Vector3D", "Vector", "",1,1,1"#,
    r#""MinDampRangeX", "double", "Number", "",0"#,
    r#""MinDampRangeY", "double", "Number", "",0"#,
    r#""MinDampRangeZ", "double", "Number", "",0"#,
    r#""MaxDampRangeX", "double", "Number", "",0"#,
    r#""MaxDampRangeY", "double", "Number", "",0"#,
    r#""MaxDampRangeZ", "double", "Number", "",0"#,
    r#""MinDampStrengthX", "double", "Number", "",0"#,
    r#""MinDampStrengthY", "double", "Number", "",0"#,
    r#""MinDampStrengthZ", "double", "Number", "",0"#,
    r#""MaxDampStrengthX", "double", "Number", "",0"#,
    r#""MaxDampStrengthY", "double", "Number", "",0"#,
    r#""MaxDampStrengthZ", "double", "Number", "",0"#,
    r#""PreferedAngleX", "double", "Number", "",0"#,
    r#""PreferedAngleY", "double", "Number", "",0"#,
    r#""PreferedAngleZ", "double", "Number", "",0"#,
    r#""LookAtProperty", "object", "", """#,
    r#""UpVectorProperty", "object", "", """#,
    r#""Show", "bool", "", "",1"#,
    r#""NegativePercentShapeSupport", "bool", "", "",1"#,
    r#""DefaultAttributeIndex", "int", "Integer", "",-1"#,
    r#""Freeze", "bool", "", "",0"#,
    r#""LODBox", "bool", "", "",0"#,
    r#""Lcl Translation", "Lcl Translation", "", "A",0,0,0"#,
    r#""Lcl Rotation", "Lcl Rotation", "", "A",0,0,0"#,
    r#""Lcl Scaling", "Lcl Scaling", "", "A",1,1,1"#,
    r#""Visibility", "Visibility", "", "A",1"#,
    r#""Visibility Inheritance", "Visibility Inheritance", "", "",1"#,
];

const GEOMETRY_TEMPLATE: &[&str] = &[
    r#""Color", "ColorRGB", "Color", "",0.8,0.8,0.8"#,
    r#""BBoxMin", "Vector3D", "Vector", "",0,0,0"#,
    r#""BBoxMax", "Vector3D", "Vector", "",0,0,0"#,
    r#""Primary Visibility", "bool", "", "",1"#,
    r#""Casts Shadows", "bool", "", "",1"#,
    r#""Receive Shadows", "bool", "", "",1"#,
];

const MATERIAL_TEMPLATE: &[&str] = &[
    r#""ShadingModel", "KString", "", "", "Phong""#,
    r#""MultiLayer", "bool", "", "",0"#,
    r#""EmissiveColor", "Color", "", "A",0,0,0"#,
    r#""EmissiveFactor", "Number", "", "A",1"#,
    r#""AmbientColor", "Color", "", "A",0.2,0.2,0.2"#,
    r#""AmbientFactor", "Number", "", "A",1"#,
    r#""DiffuseColor", "Color", "", "A",0.8,0.8,0.8"#,
    r#""DiffuseFactor", "Number", "", "A",1"#,
    r#""Bump", "Vector3D", "Vector", "",0,0,0"#,
    r#""NormalMap", "Vector3D", "Vector", "",0,0,0"#,
    r#""BumpFactor", "double", "Number", "",1"#,
    r#""TransparentColor", "Color", "", "A",0,0,0"#,
    r#""TransparencyFactor", "Number", "", "A",0"#,
    r#""DisplacementColor", "ColorRGB", "Color", "",0,0,0"#,
    r#""DisplacementFactor", "double", "Number", "",1"#,
    r#""VectorDisplacementColor", "ColorRGB", "Color", "",0,0,0"#,
    r#""VectorDisplacementFactor", "double", "Number", "",1"#,
    r#""SpecularColor", "Color", "", "A",0.2,0.2,0.2"#,
    r#""SpecularFactor", "Number", "", "A",1"#,
    r#""ShininessExponent", "Number", "", "A",20"#,
    r#""ReflectionColor", "Color", "", "A",0,0,0"#,
    r#""ReflectionFactor", "Number", "", "A",1"#,
];

const TEXTURE_TEMPLATE: &[&str] = &[
    r#""TextureTypeUse", "enum", "", "",0"#,
    r#""Texture alpha", "Number", "", "A",1"#,
    r#""CurrentMappingType", "enum", "", "",0"#,
    r#""WrapModeU", "enum", "", "",0"#,
    r#""WrapModeV", "enum", "", "",0"#,
    r#""UVSwap", "bool", "", "",0"#,
    r#""PremultiplyAlpha", "bool", "", "",1"#,
    r#""Translation", "Vector", "", "A",0,0,0"#,
    r#""Rotation", "Vector", "", "A",0,0,0"#,
    r#""Scaling", "Vector", "", "A",1,1,1"#,
    r#""TextureRotationPivot", "Vector3D", "Vector", "",0,0,0"#,
    r#""TextureScalingPivot", "Vector3D", "Vector", "",0,0,0"#,
    r#""CurrentTextureBlendMode", "enum", "", "",1"#,
    r#""UVSet", "KString", "", "", "default""#,
    r#""UseMaterial", "bool", "", "",0"#,
    r#""UseMipMap", "bool", "", "",0"#,
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn info() -> DocumentInfo {
        DocumentInfo {
            url: "/tmp/out/house.fbx".to_string(),
            creator: "test creator".to_string(),
            timestamp: Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap(),
        }
    }

    #[test]
    fn sections_in_order() {
        let counts = ObjectCounts { models: 2, geometries: 1, materials: 0, textures: 0 };
        let doc = assemble("\tMODEL\n", "\tCONN\n", &counts, &info()).unwrap();

        let order = ["FBXHeaderExtension:", "GlobalSettings:", "Definitions:", "Objects:", "Connections:"]
            .map(|s| doc.find(s).unwrap());
        assert!(order.windows(2).all(|w| w[0] < w[1]));
        assert!(doc.starts_with("; FBX 7.3.0 project file\n"));
        assert!(doc.contains("Objects:  {\n\tMODEL\n}\n"));
        assert!(doc.contains("\tCONN\n}\n"));
    }

    #[test]
    fn header_metadata() {
        let doc = assemble("", "", &ObjectCounts::default(), &info()).unwrap();
        assert!(doc.contains("\t\tYear: 2024\n\t\tMonth: 3\n\t\tDay: 9\n\t\tHour: 14\n\t\tMinute: 5\n\t\tSecond: 7\n"));
        assert!(doc.contains("\tCreator: \"test creator\"\n"));
        assert!(doc.contains("P: \"DocumentUrl\", \"KString\", \"Url\", \"\", \"/tmp/out/house.fbx\""));
        assert!(doc.contains("P: \"SrcDocumentUrl\", \"KString\", \"Url\", \"\", \"/tmp/out/house.fbx\""));
    }

    #[test]
    fn definition_counts() {
        let counts = ObjectCounts { models: 3, geometries: 2, materials: 1, textures: 0 };
        let doc = assemble("", "", &counts, &info()).unwrap();
        assert!(doc.contains("\tCount: 7\n"));
        assert!(doc.contains("\tObjectType: \"Model\" {\n\t\tCount: 3\n"));
        assert!(doc.contains("\tObjectType: \"Geometry\" {\n\t\tCount: 2\n"));
        assert!(doc.contains("\tObjectType: \"Material\" {\n\t\tCount: 1\n"));
        assert!(!doc.contains("ObjectType: \"Texture\""));
    }
}
