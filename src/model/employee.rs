use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// User enrolled on the device.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({ "userId": "7", "name": "Juan Dela Cruz" }))]
pub struct DeviceUser {
    pub user_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Employee {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}

impl Employee {
    pub fn from_device_user(user: &DeviceUser) -> Self {
        let mut parts = user.name.split_whitespace();
        let first_name = parts.next().unwrap_or_default().to_string();
        let last_name = parts.collect::<Vec<_>>().join(" ");

        Self {
            employee_id: user.user_id.trim().to_string(),
            first_name,
            last_name,
            full_name: user.name.trim().to_string(),
        }
    }
}

/// Lookup of employees by device user id. Unknown ids resolve to blank names.
#[derive(Debug, Clone, Default)]
pub struct EmployeeDirectory {
    by_id: HashMap<String, Employee>,
}

impl EmployeeDirectory {
    pub fn from_users(users: &[DeviceUser]) -> Self {
        let by_id = users
            .iter()
            .map(Employee::from_device_user)
            .map(|e| (e.employee_id.clone(), e))
            .collect();
        Self { by_id }
    }

    pub fn get(&self, employee_id: &str) -> Option<&Employee> {
        self.by_id.get(employee_id)
    }

    pub fn names(&self, employee_id: &str) -> (String, String) {
        self.get(employee_id)
            .map(|e| (e.first_name.clone(), e.last_name.clone()))
            .unwrap_or_default()
    }

    /// Full device name, falling back to the id itself.
    pub fn username(&self, employee_id: &str) -> String {
        match self.get(employee_id) {
            Some(e) if !e.full_name.is_empty() => e.full_name.clone(),
            _ => employee_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str) -> DeviceUser {
        DeviceUser {
            user_id: id.into(),
            name: name.into(),
        }
    }

    #[test]
    fn splits_first_and_last_name() {
        let e = Employee::from_device_user(&user("7", "  Juan   Dela  Cruz "));
        assert_eq!(e.first_name, "Juan");
        assert_eq!(e.last_name, "Dela Cruz");
    }

    #[test]
    fn missing_lookup_defaults_to_empty_names() {
        let dir = EmployeeDirectory::from_users(&[user("7", "Ana")]);
        assert_eq!(dir.names("9"), (String::new(), String::new()));
        assert_eq!(dir.names("7"), ("Ana".to_string(), String::new()));
    }

    #[test]
    fn username_falls_back_to_id() {
        let dir = EmployeeDirectory::from_users(&[user("7", ""), user("8", "Ben Reyes")]);
        assert_eq!(dir.username("7"), "7");
        assert_eq!(dir.username("8"), "Ben Reyes");
        assert_eq!(dir.username("10"), "10");
    }
}
