use crate::ollama::LocalModel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerModel {
    pub name: String,
    pub detail: String,
}

impl From<&LocalModel> for PickerModel {
    fn from(model: &LocalModel) -> Self {
        let mut detail = model.size_label();
        if let Some(params) = model
            .details
            .as_ref()
            .and_then(|d| d.parameter_size.as_deref())
        {
            detail = format!("{params}, {detail}");
        }
        Self {
            name: model.name.clone(),
            detail,
        }
    }
}

/// Picker over the models installed on the server.
#[derive(Debug, Clone)]
pub struct ModelPickerModal {
    pub models: Vec<PickerModel>,
    pub selected: usize,
}

impl ModelPickerModal {
    /// Opens with `current` preselected when it is installed.
    #[must_use]
    pub fn new(models: &[LocalModel], current: Option<&str>) -> Self {
        let models: Vec<PickerModel> = models.iter().map(PickerModel::from).collect();
        let selected = current
            .and_then(|name| models.iter().position(|m| m.name == name))
            .unwrap_or(0);
        Self { models, selected }
    }

    #[must_use]
    pub fn selected_model(&self) -> Option<String> {
        self.models.get(self.selected).map(|m| m.name.clone())
    }

    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.models.len()
    }

    pub const fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub const fn select_next(&mut self) {
        if self.selected + 1 < self.models.len() {
            self.selected += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(name: &str) -> LocalModel {
        LocalModel {
            name: name.into(),
            size: 2_000_000_000,
            modified_at: None,
            digest: String::new(),
            details: None,
        }
    }

    #[test]
    fn preselects_current_model() {
        let modal = ModelPickerModal::new(&[model("a"), model("b")], Some("b"));
        assert_eq!(modal.selected_model().as_deref(), Some("b"));
        assert_eq!(modal.models[0].detail, "2.0 GB");
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut modal = ModelPickerModal::new(&[model("a"), model("b")], None);
        modal.select_prev();
        assert_eq!(modal.selected, 0);
        modal.select_next();
        modal.select_next();
        assert_eq!(modal.selected, 1);
    }

    #[test]
    fn empty_picker_has_no_selection() {
        let modal = ModelPickerModal::new(&[], Some("a"));
        assert_eq!(modal.selected_model(), None);
    }
}
