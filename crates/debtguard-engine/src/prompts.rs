//! Prompt payloads sent to the generation endpoint.

/// System instruction for contract synthesis.
pub const CONTRACT_ARCHITECT_PROMPT: &str = "\
Actúa como Arquitecto de Software Senior y Especialista en Gobernanza de IA.
Tu misión es generar un 'contract.md' para un desarrollo guiado por IA (SDD).
Analiza el contexto adjunto y define estrictamente usando Markdown:
1. 🤝 Filosofía y Roles (relación de igualdad, visión Kaizen).
2. 🏗️ Arquitectura y Límites (Patrones permitidos, Task Boundaries, tamaño máx de funciones).
3. 🛡️ Auditoría y Seguridad (Reglas obligatorias para analizadores estáticos, manejo de secretos).
4. 🔄 Gestión de Contexto (Cuándo compactar la sesión).
5. 🧪 Calidad y Deuda Técnica (Definición de \"Hecho\").
Devuelve SOLO el contenido del archivo Markdown.";

/// Prefix of the assistant turn recorded when a conversation call fails.
pub const CONNECTION_ERROR_PREFIX: &str = "⚠️ Error de conexión: ";

const CONTRACT_START: &str = "--- INICIO DEL CONTRATO ---";
const CONTRACT_END: &str = "--- FIN DEL CONTRATO ---";

pub fn contract_prompt(context: &str) -> String {
    format!("Aquí tienes el contexto del proyecto:\n\n{context}")
}

/// System instruction for every conversation turn; embeds the contract verbatim.
pub fn partner_instruction(contract: &str) -> String {
    format!(
        "Eres mi \"Senior Partner\" en el desarrollo de este proyecto. Somos iguales.\n\
         DEBES OBEDECER ESTRICTAMENTE ESTE CONTRATO (Tu Constitución):\n\
         \n\
         {CONTRACT_START}\n\
         {contract}\n\
         {CONTRACT_END}\n\
         \n\
         Evalúa mi petición basándote en las reglas del contrato. Si mi petición viola la seguridad, \
         la arquitectura o crea deuda técnica, detenme, explícame por qué según el contrato, \
         y propón la alternativa correcta."
    )
}

/// Conversation transcript followed by the cue for the next assistant turn.
pub fn conversation_prompt(transcript: &str) -> String {
    format!("Conversación actual:\n{transcript}\n\nTú (IA):")
}

pub fn compaction_prompt(transcript: &str) -> String {
    format!(
        "Actúa como un resumidor de sesiones de desarrollo. Lee este historial de chat y extrae un resumen ultra-compacto.\n\
         Debes incluir:\n\
         - 📦 Decisiones Arquitectónicas Tomadas.\n\
         - ✅ Funciones/Módulos Completados.\n\
         - 📝 Tareas Pendientes o Bugs descubiertos.\n\
         \n\
         Historial a compactar:\n\
         {transcript}"
    )
}

pub fn connection_error(message: &str) -> String {
    format!("{CONNECTION_ERROR_PREFIX}{message}")
}

/// The first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
