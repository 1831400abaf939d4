use crate::models::{StoriesState, Story};

/// Every way the story list can change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoriesAction {
    FetchInit,
    /// Page 0 replaces the list, any later page is appended to it.
    FetchSuccess { list: Vec<Story>, page: usize },
    FetchFailure,
    RemoveStory(Story),
}

/// Computes the next state. The input is left untouched and only the fields
/// the action is about change in the output.
pub fn stories_reducer(state: &StoriesState, action: StoriesAction) -> StoriesState {
    match action {
        StoriesAction::FetchInit => StoriesState {
            is_loading: true,
            is_error: false,
            ..state.clone()
        },
        StoriesAction::FetchSuccess { list, page } => {
            let data = if page == 0 {
                list
            } else {
                let mut data = Vec::with_capacity(state.data.len() + list.len());
                data.extend_from_slice(&state.data);
                data.extend(list);
                data
            };

            StoriesState {
                data,
                page,
                is_loading: false,
                is_error: false,
            }
        }
        StoriesAction::FetchFailure => StoriesState {
            is_loading: false,
            is_error: true,
            ..state.clone()
        },
        StoriesAction::RemoveStory(story) => StoriesState {
            data: state
                .data
                .iter()
                .filter(|item| item.object_id != story.object_id)
                .cloned()
                .collect(),
            ..state.clone()
        },
    }
}
