//! Built-in rules used when configuration supplies none.

use crate::model::{RuleAction, RuleDefinition};

/// The default rule set: casual chat, domain terms, general knowledge.
pub fn default_rules() -> Vec<RuleDefinition> {
    vec![
        RuleDefinition::new(
            "casual_chat",
            1,
            r#"query CONTAINS_ANY ["你好", "谢谢", "再见", "哈哈", "hello", "thanks", "thank you", "goodbye", "haha"]"#,
            RuleAction::skip(0.9, "recognized as casual chat"),
        )
        .with_description("Greetings, thanks and small talk"),
        RuleDefinition::new(
            "force_retrieval",
            2,
            r#"query CONTAINS_ANY ["疾病", "症状", "诊断", "治疗", "疫苗", "感染", "炎症", "手术", "药物", "disease", "symptom", "diagnos", "treatment", "vaccin", "infection", "inflammation", "surgery", "medication"]"#,
            RuleAction::retrieve(0.95, "contains domain keywords"),
        )
        .with_description("Veterinary domain terms that need the knowledge base"),
        RuleDefinition::new(
            "general_knowledge",
            3,
            r#"query CONTAINS_ANY ["什么是", "介绍一下", "简单说", "解释一下", "what is", "explain", "briefly"]"#,
            RuleAction::skip(0.8, "recognized as a general knowledge question"),
        )
        .with_description("Generic explanations the model can answer directly"),
    ]
}
