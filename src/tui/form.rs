//! Form state for the TUI.
//!
//! Every categorical field is a cycler over the distinct values of its
//! reference-dataset column, so the form can only ever produce values the
//! dataset contains. Age is a bounded number input.

use crate::data::{DEFAULT_AGE, ReferenceTable};
use crate::domain::{Field, Profile};

/// Form sections, in display order.
pub const GROUPS: [(&str, &[Field]); 3] = [
    (
        "Informações Pessoais",
        &[Field::Age, Field::Gender, Field::Disability, Field::State],
    ),
    ("Informações Profissionais", &[Field::JobTitle, Field::Seniority]),
    ("Experiência", &[Field::ExperienceData, Field::ExperienceIt]),
];

#[derive(Debug, Clone)]
struct Choice {
    field: Field,
    options: Vec<String>,
    selected: usize,
}

#[derive(Debug, Clone)]
pub struct FormState {
    age: i64,
    age_bounds: (i64, i64),
    /// Pending digits while the age is being typed.
    age_input: Option<String>,
    choices: Vec<Choice>,
    focus: usize,
}

impl FormState {
    pub fn new(table: &ReferenceTable) -> Self {
        let age_bounds = table.age_bounds();
        let choices = Field::CATEGORICAL
            .into_iter()
            .map(|field| Choice {
                field,
                options: table.distinct(field),
                selected: 0,
            })
            .collect();

        Self {
            age: DEFAULT_AGE.clamp(age_bounds.0, age_bounds.1),
            age_bounds,
            age_input: None,
            choices,
            focus: 0,
        }
    }

    /// Rebuild options from a reloaded table, keeping selections that still exist.
    pub fn refresh(&mut self, table: &ReferenceTable) {
        let previous = self.clone();
        let focus = self.focus;
        *self = Self::new(table);
        self.focus = focus;
        self.age = previous.age.clamp(self.age_bounds.0, self.age_bounds.1);
        for choice in &mut self.choices {
            if let Some(value) = previous.value(choice.field) {
                if let Some(idx) = choice.options.iter().position(|o| o == value) {
                    choice.selected = idx;
                }
            }
        }
    }

    pub fn focused(&self) -> Field {
        Field::ALL[self.focus]
    }

    pub fn focus_next(&mut self) {
        self.commit_age();
        self.focus = (self.focus + 1) % Field::ALL.len();
    }

    pub fn focus_prev(&mut self) {
        self.commit_age();
        self.focus = (self.focus + Field::ALL.len() - 1) % Field::ALL.len();
    }

    /// Step the focused field by `delta` (options wrap, age saturates).
    pub fn step(&mut self, delta: i64) {
        match self.focused() {
            Field::Age => {
                self.commit_age();
                self.age = (self.age + delta).clamp(self.age_bounds.0, self.age_bounds.1);
            }
            field => {
                let Some(choice) = self.choices.iter_mut().find(|c| c.field == field) else {
                    return;
                };
                let n = choice.options.len() as i64;
                if n == 0 {
                    return;
                }
                choice.selected = (choice.selected as i64 + delta).rem_euclid(n) as usize;
            }
        }
    }

    pub fn type_digit(&mut self, digit: char) {
        if self.focused() != Field::Age || !digit.is_ascii_digit() {
            return;
        }
        let input = self.age_input.get_or_insert_with(String::new);
        if input.len() < 3 {
            input.push(digit);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(input) = &mut self.age_input {
            input.pop();
        }
    }

    /// Apply typed digits to the age, clamped into range.
    pub fn commit_age(&mut self) {
        if let Some(input) = self.age_input.take() {
            if let Ok(v) = input.parse::<i64>() {
                self.age = v.clamp(self.age_bounds.0, self.age_bounds.1);
            }
        }
    }

    pub fn age_bounds(&self) -> (i64, i64) {
        self.age_bounds
    }

    /// Text shown for a field (typed digits win while editing age).
    pub fn display(&self, field: Field) -> String {
        match field {
            Field::Age => match &self.age_input {
                Some(input) => format!("{input}_"),
                None => self.age.to_string(),
            },
            _ => self.value(field).unwrap_or("-").to_string(),
        }
    }

    fn value(&self, field: Field) -> Option<&str> {
        let choice = self.choices.iter().find(|c| c.field == field)?;
        choice.options.get(choice.selected).map(String::as_str)
    }

    /// Assemble the submitted profile; the error names the first field without options.
    pub fn to_profile(&mut self) -> Result<Profile, Field> {
        self.commit_age();
        let get = |field: Field| self.value(field).map(str::to_string).ok_or(field);
        Ok(Profile {
            age: self.age,
            gender: get(Field::Gender)?,
            disability: get(Field::Disability)?,
            state: get(Field::State)?,
            job_title: get(Field::JobTitle)?,
            seniority: get(Field::Seniority)?,
            experience_data: get(Field::ExperienceData)?,
            experience_it: get(Field::ExperienceIt)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReferenceRow;

    fn row(age: i64, state: &str, job: &str) -> ReferenceRow {
        ReferenceRow {
            age: Some(age),
            gender: "Masculino".to_string(),
            disability: "Não".to_string(),
            state: state.to_string(),
            job_title: job.to_string(),
            seniority: "Pleno".to_string(),
            experience_data: "de 1 a 2 anos".to_string(),
            experience_it: "de 3 a 4 anos".to_string(),
        }
    }

    fn table() -> ReferenceTable {
        ReferenceTable::from_rows(vec![
            row(21, "SP", "Data Engineer"),
            row(40, "MG", "Analista de Dados"),
            row(35, "RJ", "Data Engineer"),
        ])
    }

    #[test]
    fn starts_on_first_sorted_options() {
        let mut form = FormState::new(&table());
        let profile = form.to_profile().unwrap();
        assert_eq!(profile.age, 30);
        assert_eq!(profile.state, "MG");
        assert_eq!(profile.job_title, "Analista de Dados");
    }

    #[test]
    fn options_wrap_around() {
        let mut form = FormState::new(&table());
        form.focus_next();
        form.focus_next();
        form.focus_next();
        assert_eq!(form.focused(), Field::State);
        form.step(-1);
        assert_eq!(form.display(Field::State), "SP");
        form.step(1);
        assert_eq!(form.display(Field::State), "MG");
    }

    #[test]
    fn age_is_clamped_to_dataset_minimum_and_hundred() {
        let mut form = FormState::new(&table());
        assert_eq!(form.age_bounds(), (21, 100));
        form.type_digit('9');
        assert_eq!(form.display(Field::Age), "9_");
        form.commit_age();
        assert_eq!(form.display(Field::Age), "21");

        form.step(200);
        assert_eq!(form.display(Field::Age), "100");
    }

    #[test]
    fn submitted_values_always_come_from_dataset() {
        let table = table();
        let mut form = FormState::new(&table);
        for _ in 0..Field::ALL.len() {
            form.step(2);
            form.focus_next();
            let profile = form.to_profile().unwrap();
            assert!(crate::app::pipeline::unknown_values(&profile, &table).is_empty());
        }
    }

    #[test]
    fn refresh_keeps_existing_selection() {
        let mut form = FormState::new(&table());
        for _ in 0..3 {
            form.focus_next();
        }
        form.step(1);
        assert_eq!(form.display(Field::State), "RJ");

        let reloaded = ReferenceTable::from_rows(vec![row(25, "RJ", "X"), row(25, "BA", "X")]);
        form.refresh(&reloaded);
        assert_eq!(form.display(Field::State), "RJ");
        assert_eq!(form.focused(), Field::State);
    }

    #[test]
    fn empty_table_cannot_submit() {
        let mut form = FormState::new(&ReferenceTable::default());
        assert_eq!(form.display(Field::Gender), "-");
        assert_eq!(form.to_profile().unwrap_err(), Field::Gender);
    }
}
