use async_trait::async_trait;

use crate::engines::{Engine, EngineData, EngineMetadata};
use crate::errors::EngineFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Case {
    Upper,
    Lower,
    Title,
}

/// Change Text Case engine - converts text to a different case
pub struct ChangeTextCaseEngine {
    case: Case,
}

impl ChangeTextCaseEngine {
    pub fn upper() -> Self {
        Self { case: Case::Upper }
    }

    pub fn lower() -> Self {
        Self { case: Case::Lower }
    }

    pub fn title() -> Self {
        Self { case: Case::Title }
    }
}

fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl Engine for ChangeTextCaseEngine {
    async fn execute(&mut self, input: EngineData) -> Result<EngineData, EngineFailure> {
        let text = input.as_text()?;
        let result = match self.case {
            Case::Upper => text.to_uppercase(),
            Case::Lower => text.to_lowercase(),
            Case::Title => title_case(text),
        };
        Ok(EngineData::text(result).with_communication_id(input.communication_id))
    }

    fn metadata(&self) -> EngineMetadata {
        let name = match self.case {
            Case::Upper => "change_text_case_upper",
            Case::Lower => "change_text_case_lower",
            Case::Title => "change_text_case_title",
        };
        EngineMetadata::text(name, "Changes the case of the input text")
    }
}
