// src/domain/role.rs

use serde::{Deserialize, Serialize};

/// 社内の職位。数値が大きいほど強い権限を持つ
///
/// 外部表現は数値レベル（1/2/3）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Role {
    Employee = 1,
    Leader = 2,
    Director = 3,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Employee, Role::Leader, Role::Director];

    /// ロール名を文字列として取得
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "Employee",
            Role::Leader => "Leader",
            Role::Director => "Director",
        }
    }

    /// 権限レベルを数値で取得（高いほど強い権限）
    pub fn level(&self) -> i32 {
        *self as i32
    }

    /// 数値レベルからロールを復元
    pub fn from_level(level: i32) -> Option<Self> {
        match level {
            1 => Some(Role::Employee),
            2 => Some(Role::Leader),
            3 => Some(Role::Director),
            _ => None,
        }
    }

    /// 自分の権限以下のロールであれば付与できる
    pub fn can_assign(&self, target: Role) -> bool {
        *self >= target
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "employee" => Ok(Role::Employee),
            "leader" => Ok(Role::Leader),
            "director" => Ok(Role::Director),
            _ => Err(format!("Invalid role name: {}", s)),
        }
    }
}

impl TryFrom<i32> for Role {
    type Error = String;

    fn try_from(level: i32) -> Result<Self, Self::Error> {
        Role::from_level(level).ok_or_else(|| format!("Invalid role level: {}", level))
    }
}

impl From<Role> for i32 {
    fn from(role: Role) -> Self {
        role.level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_ordering_follows_level() {
        assert!(Role::Director > Role::Leader);
        assert!(Role::Leader > Role::Employee);
        assert_eq!(Role::Employee.level(), 1);
        assert_eq!(Role::Leader.level(), 2);
        assert_eq!(Role::Director.level(), 3);
    }

    #[test]
    fn test_can_assign_is_monotone() {
        for actor in Role::ALL {
            for target in Role::ALL {
                assert_eq!(
                    actor.can_assign(target),
                    actor.level() >= target.level(),
                    "{} -> {}",
                    actor,
                    target
                );
            }
        }
    }

    #[test]
    fn test_role_conversion() {
        assert_eq!(Role::from_str("director"), Ok(Role::Director));
        assert_eq!(Role::from_str("LEADER"), Ok(Role::Leader));
        assert!(Role::from_str("admin").is_err());

        assert_eq!(Role::try_from(1), Ok(Role::Employee));
        assert!(Role::try_from(0).is_err());
        assert!(Role::try_from(4).is_err());
    }

    #[test]
    fn test_role_serializes_as_level() {
        assert_eq!(serde_json::to_string(&Role::Director).unwrap(), "3");
        assert_eq!(serde_json::from_str::<Role>("1").unwrap(), Role::Employee);
        assert_eq!(serde_json::from_str::<Role>("2").unwrap(), Role::Leader);

        // 範囲外や名前は受け付けない
        assert!(serde_json::from_str::<Role>("0").is_err());
        assert!(serde_json::from_str::<Role>("4").is_err());
        assert!(serde_json::from_str::<Role>(r#""Director""#).is_err());
    }
}
