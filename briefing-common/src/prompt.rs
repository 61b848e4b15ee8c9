//! Prompt construction for briefing extraction
//!
//! The conversation is embedded verbatim. The template fixes the six-field
//! JSON shape and forbids prose outside the JSON object.

use crate::config::MissingFieldPolicy;

const INSTRUCTIONS: &str = "Extraia um briefing profissional da seguinte conversa com um cliente. \
O briefing deve conter: Objetivo, Público-alvo, Referências, Prazos, Orçamento e Observações extras. \
Ignore mensagens irrelevantes.";

const RESPONSE_SHAPE: &str = r#"Por favor, forneça APENAS o JSON, sem nenhum texto adicional. O formato deve ser:
{
    "objetivo": "descrição clara do objetivo principal",
    "publico_alvo": "descrição do público-alvo",
    "referencias": ["referência 1", "referência 2", "..."],
    "prazos": {
        "inicio": "data de início",
        "entrega": "data de entrega",
        "etapas_intermediarias": "datas importantes"
    },
    "orcamento": {
        "total": 0.0,
        "por_etapa": 0.0
    },
    "observacoes": ["observação 1", "observação 2", "..."]
}
Todos os valores de "prazos" devem ser textos e todos os valores de "orcamento" devem ser números."#;

const STRICT_MISSING: &str = "Se alguma informação não estiver presente na conversa, deixe o campo vazio \
(\"\" para textos, [] para listas e {} para prazos e orçamento). Não invente dados.";

const INFER_MISSING: &str =
    "Se alguma informação não estiver disponível na conversa, use valores realistas baseados no contexto.";

/// Render the extraction prompt for a conversation
pub fn build_prompt(conversation: &str, policy: MissingFieldPolicy) -> String {
    let missing = match policy {
        MissingFieldPolicy::Strict => STRICT_MISSING,
        MissingFieldPolicy::Infer => INFER_MISSING,
    };

    format!(
        "{}\n\nConversa:\n{}\n\n{}\n{}",
        INSTRUCTIONS, conversation, RESPONSE_SHAPE, missing
    )
}
