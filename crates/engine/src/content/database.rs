use std::collections::HashMap;

use crate::app::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BossBehaviorKind {
    Patrol,
    PatrolJumpCharge,
}

impl BossBehaviorKind {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Patrol => "Patrol",
            Self::PatrolJumpCharge => "PatrolJumpCharge",
        }
    }
}

/// Per-stage encounter descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct StageDef {
    pub stage: u32,
    pub label: String,
    pub background: String,
    pub behavior: BossBehaviorKind,
    pub boss_hit_counter: u32,
    pub boss_spawn: Vec2,
    pub boss_speed: f32,
    pub attack_range: f32,
    pub roaming_min: f32,
    pub roaming_max: f32,
    pub can_jump: bool,
    pub throws_slips: bool,
}

#[derive(Debug, Default, Clone)]
pub struct StageDatabase {
    stages: Vec<StageDef>,
    index_by_stage: HashMap<u32, usize>,
}

impl StageDatabase {
    pub fn from_stage_defs(mut stages: Vec<StageDef>) -> Self {
        stages.sort_by_key(|def| def.stage);
        let index_by_stage = stages
            .iter()
            .enumerate()
            .map(|(index, def)| (def.stage, index))
            .collect();
        Self {
            stages,
            index_by_stage,
        }
    }

    pub fn stage(&self, stage: u32) -> Option<&StageDef> {
        self.index_by_stage
            .get(&stage)
            .and_then(|index| self.stages.get(*index))
    }

    pub fn stages(&self) -> &[StageDef] {
        &self.stages
    }

    pub fn first_stage(&self) -> Option<&StageDef> {
        self.stages.first()
    }
}
