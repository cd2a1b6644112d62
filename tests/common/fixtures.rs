use boostme::model::{AttributeInput, NewChallenge, NewClient};
use boostme::storage::Storage;

pub fn challenge(title: &str, category: &str) -> NewChallenge {
    NewChallenge::new(title, format!("{title} for a whole day."), category)
}

pub fn client(name: &str, email: &str) -> NewClient {
    NewClient {
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        attributes: vec![],
    }
}

pub fn client_with_attributes(name: &str, email: &str, attrs: &[(&str, &str)]) -> NewClient {
    NewClient {
        attributes: attrs
            .iter()
            .map(|(k, v)| AttributeInput::new(*k, *v))
            .collect(),
        ..client(name, email)
    }
}

/// Insert `(title, category)` pairs and return their ids in order.
pub fn insert_challenges(storage: &Storage, items: &[(&str, &str)]) -> Vec<i64> {
    let repo = storage.challenges();
    items
        .iter()
        .map(|(title, category)| {
            repo.create(&challenge(title, category))
                .expect("insert challenge")
        })
        .collect()
}
