pub const GRADER_SYSTEM_ROLE: &str = "Ты преподаватель французского языка.";

/// Grading instruction for the oracle. The five numbered sections are a
/// contract: clients split the analysis on them.
pub fn grading_prompt(phrase_fr: &str, answer: &str) -> String {
    format!(
        "Ты — строгий и точный преподаватель французского языка.

Исходная конструкция:
{phrase_fr}

Ответ ученика:
{answer}

Сделай разбор СТРОГО по структуре:

1) Перевод ответа на русский
2) Фраза корректна / некорректна
3) Если некорректна — правильный вариант
4) Краткий грамматический разбор (по делу)
5) 2 примера с той же конструкцией

Пиши кратко, без воды."
    )
}

pub fn task_instruction(phrase_fr: &str) -> String {
    format!(
        "Составь полное предложение на французском языке, используя конструкцию «{phrase_fr}». \
         Предложение должно быть законченным и грамматически верным."
    )
}
