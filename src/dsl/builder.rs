use crate::dsl::{FlowDocument, QuestionSpec, TransitionSpec};

pub struct FlowDocumentBuilder {
    name: String,
    description: String,
    questions: Vec<QuestionSpec>,
    transitions: Vec<TransitionSpec>,
}

impl FlowDocumentBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            questions: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn question(mut self, key: &str, text: &str) -> Self {
        self.questions.push(QuestionSpec {
            key: key.to_string(),
            text: text.to_string(),
        });
        self
    }

    /// Adds a transition from `from` to `to`, taken when the answer is `when`.
    pub fn transition(mut self, from: &str, to: &str, when: &str) -> Self {
        self.transitions.push(TransitionSpec {
            from: from.to_string(),
            to: to.to_string(),
            when: when.to_string(),
        });
        self
    }

    pub fn build(self) -> FlowDocument {
        FlowDocument {
            name: self.name,
            description: self.description,
            questions: self.questions,
            transitions: self.transitions,
        }
    }
}
