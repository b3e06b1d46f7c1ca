/// Grounding rules submitted with every fallback job. The model must
/// answer only from the supplied context, decline instead of guessing,
/// and always close with a sources section.
pub const GROUNDING_RULES: &str = r#"Jsi „Virtuální asistent obce". Odpovídáš profesionálně, stručně a pouze z poskytnutých podkladů (CONTEXT).
Pravidla:
1) Pokud je odpověď v CONTEXTu, odpověz přesně.
2) Pokud si nejsi jistý nebo to v CONTEXTu není, nehádej: napiš, že to nemáš potvrzené, a pošli nejrelevantnější odkaz z CONTEXTu (nebo web obce).
3) Když se uživatel ptá „kde najdu…", odpověz primárně odkazem.
4) Na konec odpovědi vždy přidej sekci „Zdroje:" s odkazy z CONTEXTu, které jsi použil."#;

/// Assemble the single input text submitted to the job: rules, context
/// block, question.
pub fn fallback_input(question: &str, context: Option<&str>) -> String {
    let context = match context {
        Some(c) if !c.trim().is_empty() => c,
        _ => "- (žádné podklady)",
    };
    format!(
        "{}\n\nCONTEXT:\n{}\n\nDOTAZ: {}",
        GROUNDING_RULES, context, question
    )
}
