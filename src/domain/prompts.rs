//! 各任务类型的固定提示词

use super::language::language_name;

/// 文字识别（只提取可见文字）
pub const RECOGNIZE_TEXT_PROMPT: &str = "Extrae todo el texto visible en esta imagen. Devuelve SOLO el texto, sin explicaciones adicionales, sin formateo y sin comentarios. Si no hay texto, responde \"No hay texto visible\".";

/// 关键词提取（中性提示，偏向图片本身的语言）
pub const EXTRACT_KEYWORDS_PROMPT: &str = "Analiza esta imagen y extrae exactamente 5 palabras clave o conceptos principales que representen su contenido. Separa cada palabra clave con comas y responde SOLO con las palabras clave, sin frases ni explicaciones adicionales.";

const DESCRIBE_IMAGE_PROMPT_ES: &str = "Describe esta imagen en detalle. Incluye los elementos principales, colores, acciones y contexto visible.";

const DESCRIBE_IMAGE_PROMPT_EN: &str = "Describe this image in detail. Include the main elements, colors, actions, and visible context.";

/// 图片描述提示词，按输出语言选择模板；未提供模板的语言使用英文
pub fn describe_image_prompt(target_lang: &str) -> &'static str {
    match target_lang {
        "es" => DESCRIBE_IMAGE_PROMPT_ES,
        _ => DESCRIBE_IMAGE_PROMPT_EN,
    }
}

/// 翻译提示词
pub fn translation_prompt(text: &str, target_lang: &str) -> String {
    let target_name = language_name(target_lang);
    format!(
        "Eres un traductor profesional. Tu única tarea es traducir el siguiente texto al {name}.\n\
         \n\
         INSTRUCCIONES:\n\
         - Traduce EXACTAMENTE el texto proporcionado\n\
         - Mantén el mismo significado, tono y estilo\n\
         - NO agregues explicaciones, notas o texto adicional\n\
         - NO incluyas el texto original en tu respuesta\n\
         - Solo devuelve la traducción\n\
         \n\
         TEXTO A TRADUCIR:\n\
         {text}\n\
         \n\
         TRADUCCIÓN AL {upper}:",
        name = target_name,
        text = text,
        upper = target_name.to_uppercase(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_prompt_by_language() {
        assert!(describe_image_prompt("es").starts_with("Describe esta imagen"));
        assert!(describe_image_prompt("en").starts_with("Describe this image"));
        assert_eq!(describe_image_prompt("fr"), describe_image_prompt("en"));
    }

    #[test]
    fn test_translation_prompt_mentions_target() {
        let prompt = translation_prompt("Hello world", "es");
        assert!(prompt.contains("traducir el siguiente texto al español"));
        assert!(prompt.contains("TEXTO A TRADUCIR:\nHello world\n"));
        assert!(prompt.ends_with("TRADUCCIÓN AL ESPAÑOL:"));
    }
}
