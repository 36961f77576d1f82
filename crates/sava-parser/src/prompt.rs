// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt builders for single and combined classification requests.

use std::fmt::Write;

const ROLE: &str = "Actúa como un analista senior de riesgos agroindustriales para la región \
del Valle del Cauca, Colombia. Tu tarea es clasificar el sentimiento de noticias para un \
sistema de alertas tempranas.";

const RULES: &str = "Reglas estrictas de clasificación:
1. Negativo: plagas, sequías, fenómeno del niño, paros armados, bloqueos de vías, caída de precios, pérdidas económicas, inseguridad rural, uso excesivo de químicos.
2. Positivo: nuevas inversiones, subsidios del gobierno, tecnología agrícola, aumento de exportaciones, clima favorable, alianzas productivas, apertura de mercados.
3. Neutro: noticias meramente informativas, nombramientos administrativos, boletines técnicos sin impacto económico directo inmediato.";

/// Collapse line breaks so one item never spans several prompt lines.
fn flatten(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Prompt for one headline; the reply is expected in marker form.
pub fn single_prompt(text: &str) -> String {
    format!(
        "{ROLE}\n\n{RULES}\n\nNoticia: \"{}\"\n\n\
Responde exactamente con dos líneas:\n\
CLASIFICACIÓN: <Positivo|Negativo|Neutro>\n\
ARGUMENTO: <una frase breve que justifique la clasificación>",
        flatten(text)
    )
}

/// Prompt for several headlines, numbered from 1; the reply is expected as
/// one `N|Etiqueta|Argumento` line per item.
pub fn batch_prompt<S: AsRef<str>>(texts: &[S]) -> String {
    let mut prompt = format!("{ROLE}\n\n{RULES}\n\nNoticias:\n");
    for (i, text) in texts.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = writeln!(prompt, "{}. {}", i + 1, flatten(text.as_ref()));
    }
    let _ = write!(
        prompt,
        "\nResponde con exactamente {} líneas, una por noticia y en el mismo orden, \
con el formato:\nN|Etiqueta|Argumento\n\
donde N es el número de la noticia, Etiqueta es Positivo, Negativo o Neutro, \
y Argumento es una frase breve. No agregues texto adicional.",
        texts.len()
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_prompt_asks_for_markers() {
        let p = single_prompt("Sequía\nen el Valle");
        assert!(p.contains("Noticia: \"Sequía en el Valle\""));
        assert!(p.contains("CLASIFICACIÓN:"));
        assert!(p.contains("ARGUMENTO:"));
        assert!(p.contains("Valle del Cauca"));
    }

    #[test]
    fn batch_prompt_numbers_items_on_single_lines() {
        let p = batch_prompt(&["Inversión en caña", "Plaga\r\nde roya"]);
        assert!(p.contains("1. Inversión en caña\n"));
        assert!(p.contains("2. Plaga de roya\n"));
        assert!(p.contains("exactamente 2 líneas"));
        assert!(p.contains("N|Etiqueta|Argumento"));
    }

    #[test]
    fn batch_prompt_accepts_owned_strings() {
        let items = vec!["a".to_string()];
        assert!(batch_prompt(&items).contains("1. a\n"));
    }
}
