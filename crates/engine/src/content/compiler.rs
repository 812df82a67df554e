use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use tracing::info;

use crate::app::Vec2;

use super::database::{BossBehaviorKind, StageDatabase, StageDef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownDefType,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateStage,
    NoStages,
}

#[derive(Debug, Clone)]
pub struct ContentCompileError {
    pub code: ContentErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for ContentCompileError {}

pub fn compile_stage_database(stages_file: &Path) -> Result<StageDatabase, ContentCompileError> {
    let raw = fs::read_to_string(stages_file).map_err(|source| ContentCompileError {
        code: ContentErrorCode::ReadFile,
        message: format!("failed to read XML file: {source}"),
        file_path: stages_file.to_path_buf(),
        location: None,
    })?;
    let defs = parse_stage_defs(stages_file, &raw)?;
    let database = StageDatabase::from_stage_defs(defs);
    info!(
        file = %stages_file.display(),
        stage_count = database.stages().len(),
        "stage_defs_compiled"
    );
    Ok(database)
}

pub fn parse_stage_defs(file_path: &Path, raw: &str) -> Result<Vec<StageDef>, ContentCompileError> {
    let doc = Document::parse(raw).map_err(|error| ContentCompileError {
        code: ContentErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "Defs" {
        return Err(error_at_node(
            ContentErrorCode::InvalidRoot,
            "root element must be <Defs>".to_string(),
            file_path,
            &doc,
            root,
        ));
    }

    let mut defs = Vec::<StageDef>::new();
    let mut seen_stages = HashSet::<u32>::new();
    for child in root.children().filter(|node| node.is_element()) {
        if child.tag_name().name() != "StageDef" {
            return Err(error_at_node(
                ContentErrorCode::UnknownDefType,
                format!(
                    "unsupported def type <{}>; only <StageDef> is supported",
                    child.tag_name().name()
                ),
                file_path,
                &doc,
                child,
            ));
        }
        let def = parse_stage_def(file_path, &doc, child)?;
        if !seen_stages.insert(def.stage) {
            return Err(error_at_node(
                ContentErrorCode::DuplicateStage,
                format!("stage {} is defined more than once", def.stage),
                file_path,
                &doc,
                child,
            ));
        }
        defs.push(def);
    }

    if defs.is_empty() {
        return Err(error_at_node(
            ContentErrorCode::NoStages,
            "<Defs> must contain at least one <StageDef>".to_string(),
            file_path,
            &doc,
            root,
        ));
    }

    Ok(defs)
}

fn parse_stage_def(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> Result<StageDef, ContentCompileError> {
    let mut seen_fields = HashSet::<String>::new();
    let mut stage: Option<u32> = None;
    let mut label: Option<String> = None;
    let mut background: Option<String> = None;
    let mut behavior: Option<BossBehaviorKind> = None;
    let mut boss_hit_counter: Option<u32> = None;
    let mut boss_x: Option<f32> = None;
    let mut boss_y: Option<f32> = None;
    let mut boss_speed: Option<f32> = None;
    let mut attack_range: Option<f32> = None;
    let mut roaming_min: Option<f32> = None;
    let mut roaming_max: Option<f32> = None;
    let mut can_jump = false;
    let mut throws_slips = false;

    for field in node.children().filter(|child| child.is_element()) {
        let field_name = field.tag_name().name().to_string();
        if !seen_fields.insert(field_name.clone()) {
            return Err(error_at_node(
                ContentErrorCode::DuplicateField,
                format!("duplicate field <{}> in <StageDef>", field_name),
                file_path,
                doc,
                field,
            ));
        }

        match field_name.as_str() {
            "stage" => {
                stage = Some(positive_u32(file_path, doc, field, "stage")?);
            }
            "label" => {
                label = Some(required_text(file_path, doc, field, "label")?);
            }
            "background" => {
                background = Some(required_text(file_path, doc, field, "background")?);
            }
            "behavior" => {
                let value = required_text(file_path, doc, field, "behavior")?;
                let parsed = match value.as_str() {
                    "Patrol" => BossBehaviorKind::Patrol,
                    "PatrolJumpCharge" => BossBehaviorKind::PatrolJumpCharge,
                    _ => {
                        return Err(error_at_node(
                            ContentErrorCode::InvalidValue,
                            format!(
                                "invalid behavior '{}'; allowed values: Patrol, PatrolJumpCharge",
                                value
                            ),
                            file_path,
                            doc,
                            field,
                        ))
                    }
                };
                behavior = Some(parsed);
            }
            "bossHitCounter" => {
                boss_hit_counter = Some(positive_u32(file_path, doc, field, "bossHitCounter")?);
            }
            "bossX" => {
                boss_x = Some(finite_number(file_path, doc, field, "bossX")?);
            }
            "bossY" => {
                boss_y = Some(finite_number(file_path, doc, field, "bossY")?);
            }
            "bossSpeed" => {
                boss_speed = Some(non_negative_number(file_path, doc, field, "bossSpeed")?);
            }
            "attackRange" => {
                attack_range = Some(non_negative_number(file_path, doc, field, "attackRange")?);
            }
            "roamingMin" => {
                roaming_min = Some(non_negative_number(file_path, doc, field, "roamingMin")?);
            }
            "roamingMax" => {
                roaming_max = Some(non_negative_number(file_path, doc, field, "roamingMax")?);
            }
            "canJump" => {
                can_jump = boolean(file_path, doc, field, "canJump")?;
            }
            "throwsSlips" => {
                throws_slips = boolean(file_path, doc, field, "throwsSlips")?;
            }
            _ => {
                return Err(error_at_node(
                    ContentErrorCode::UnknownField,
                    format!("unknown field <{}> in <StageDef>", field_name),
                    file_path,
                    doc,
                    field,
                ))
            }
        }
    }

    let missing = |name: &str| {
        error_at_node(
            ContentErrorCode::MissingField,
            format!("missing required field <{}> in <StageDef>", name),
            file_path,
            doc,
            node,
        )
    };

    let stage = stage.ok_or_else(|| missing("stage"))?;
    let label = label.ok_or_else(|| missing("label"))?;
    let behavior = behavior.ok_or_else(|| missing("behavior"))?;
    let boss_hit_counter = boss_hit_counter.ok_or_else(|| missing("bossHitCounter"))?;
    let boss_x = boss_x.ok_or_else(|| missing("bossX"))?;
    let boss_y = boss_y.ok_or_else(|| missing("bossY"))?;
    let boss_speed = boss_speed.ok_or_else(|| missing("bossSpeed"))?;

    let (attack_range, roaming_min, roaming_max) = match behavior {
        BossBehaviorKind::Patrol => (
            attack_range.unwrap_or(0.0),
            roaming_min.unwrap_or(0.0),
            roaming_max.unwrap_or(0.0),
        ),
        BossBehaviorKind::PatrolJumpCharge => {
            let attack_range = attack_range.ok_or_else(|| missing("attackRange"))?;
            let roaming_min = roaming_min.ok_or_else(|| missing("roamingMin"))?;
            let roaming_max = roaming_max.ok_or_else(|| missing("roamingMax"))?;
            if roaming_min >= roaming_max {
                return Err(error_at_node(
                    ContentErrorCode::InvalidValue,
                    format!(
                        "roamingMin ({roaming_min}) must be less than roamingMax ({roaming_max})"
                    ),
                    file_path,
                    doc,
                    node,
                ));
            }
            (attack_range, roaming_min, roaming_max)
        }
    };

    Ok(StageDef {
        stage,
        label,
        background: background.unwrap_or_default(),
        behavior,
        boss_hit_counter,
        boss_spawn: Vec2::new(boss_x, boss_y),
        boss_speed,
        attack_range,
        roaming_min,
        roaming_max,
        can_jump,
        throws_slips,
    })
}

fn required_text(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    field_name: &str,
) -> Result<String, ContentCompileError> {
    let value = node.text().map(str::trim).unwrap_or_default().to_string();
    if value.is_empty() {
        return Err(error_at_node(
            ContentErrorCode::MissingField,
            format!("field <{}> must not be empty", field_name),
            file_path,
            doc,
            node,
        ));
    }
    Ok(value)
}

fn positive_u32(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    field_name: &str,
) -> Result<u32, ContentCompileError> {
    let value = required_text(file_path, doc, node, field_name)?;
    match value.parse::<u32>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(error_at_node(
            ContentErrorCode::InvalidValue,
            format!("{} '{}' must be a positive integer", field_name, value),
            file_path,
            doc,
            node,
        )),
    }
}

fn finite_number(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    field_name: &str,
) -> Result<f32, ContentCompileError> {
    let value = required_text(file_path, doc, node, field_name)?;
    let parsed = value.parse::<f32>().map_err(|_| {
        error_at_node(
            ContentErrorCode::InvalidValue,
            format!("{} '{}' is not a valid number", field_name, value),
            file_path,
            doc,
            node,
        )
    })?;
    if !parsed.is_finite() {
        return Err(error_at_node(
            ContentErrorCode::InvalidValue,
            format!("{} must be finite", field_name),
            file_path,
            doc,
            node,
        ));
    }
    Ok(parsed)
}

fn non_negative_number(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    field_name: &str,
) -> Result<f32, ContentCompileError> {
    let parsed = finite_number(file_path, doc, node, field_name)?;
    if parsed < 0.0 {
        return Err(error_at_node(
            ContentErrorCode::InvalidValue,
            format!("{} must be >= 0", field_name),
            file_path,
            doc,
            node,
        ));
    }
    Ok(parsed)
}

fn boolean(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    field_name: &str,
) -> Result<bool, ContentCompileError> {
    let value = required_text(file_path, doc, node, field_name)?;
    match value.as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(error_at_node(
            ContentErrorCode::InvalidValue,
            format!("{} '{}' must be true or false", field_name, value),
            file_path,
            doc,
            node,
        )),
    }
}

fn error_at_node(
    code: ContentErrorCode,
    message: String,
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> ContentCompileError {
    let pos = doc.text_pos_at(node.range().start);
    ContentCompileError {
        code,
        message,
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }),
    }
}
