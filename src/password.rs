//! 强密码生成模块
//!
//! 字母表由三个互不相交的字符类组成：去掉 `O` 的大写字母、小写字母、数字。
//! 每个字符类先各抽取一个字符保证覆盖，其余位置从并集中独立均匀抽取，
//! 最后整体做一次均匀洗牌。所有随机数都来自系统CSPRNG。

use crate::error::{AppError, Result};
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::{CryptoRng, Rng, RngCore};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// 默认密码长度
pub const DEFAULT_PASSWORD_LENGTH: usize = 18;

/// 密码强度下限
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// 字符类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterClass {
    /// 字符类名称
    pub name: &'static str,
    /// 有序字符集合（仅ASCII）
    pub chars: &'static str,
}

impl CharacterClass {
    /// 大写字母，不含与数字0易混淆的 `O`
    pub const UPPERCASE: CharacterClass = CharacterClass {
        name: "uppercase",
        chars: "ABCDEFGHIJKLMNPQRSTUVWXYZ",
    };

    /// 小写字母
    pub const LOWERCASE: CharacterClass = CharacterClass {
        name: "lowercase",
        chars: "abcdefghijklmnopqrstuvwxyz",
    };

    /// 数字
    pub const DIGITS: CharacterClass = CharacterClass {
        name: "digit",
        chars: "0123456789",
    };

    /// 字符数量
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// 检查字符是否属于该类
    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(c)
    }

    /// 从该类中均匀抽取一个字符
    fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        let bytes = self.chars.as_bytes();
        bytes[rng.gen_range(0..bytes.len())] as char
    }
}

/// 密码策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// 默认输出长度
    pub length: usize,
    /// 允许的最小长度
    pub min_length: usize,
    /// 必须覆盖的字符类
    pub required_classes: Vec<CharacterClass>,
}

impl PasswordPolicy {
    /// 全部字符类的并集
    pub fn alphabet(&self) -> Vec<char> {
        self.required_classes
            .iter()
            .flat_map(|class| class.chars.chars())
            .collect()
    }

    /// 检查字符类配置：至少一个字符类，每个字符类非空且只含ASCII
    pub fn validate(&self) -> Result<()> {
        if self.required_classes.is_empty() {
            return Err(AppError::validation("密码策略至少需要一个字符类"));
        }

        for class in &self.required_classes {
            if class.is_empty() {
                return Err(AppError::validation(format!("字符类 {} 为空", class.name)));
            }
            if !class.chars.is_ascii() {
                return Err(AppError::validation(format!(
                    "字符类 {} 只能包含ASCII字符",
                    class.name
                )));
            }
        }

        Ok(())
    }

    /// 检查长度是否满足策略
    pub fn check_length(&self, length: usize) -> Result<()> {
        if length < self.min_length {
            return Err(AppError::InvalidLength {
                length,
                minimum: self.min_length,
            });
        }

        if length < self.required_classes.len() {
            return Err(AppError::InsufficientLength {
                length,
                required: self.required_classes.len(),
            });
        }

        Ok(())
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            length: DEFAULT_PASSWORD_LENGTH,
            min_length: MIN_PASSWORD_LENGTH,
            required_classes: vec![
                CharacterClass::UPPERCASE,
                CharacterClass::LOWERCASE,
                CharacterClass::DIGITS,
            ],
        }
    }
}

/// 生成的密码，Debug输出中不含明文
pub struct GeneratedPassword(SecretString);

impl GeneratedPassword {
    /// 取得明文
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.expose().len()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl From<String> for GeneratedPassword {
    fn from(value: String) -> Self {
        Self(SecretString::new(value.into()))
    }
}

impl fmt::Debug for GeneratedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeneratedPassword([hidden]; len={})", self.len())
    }
}

/// 强密码生成器
#[derive(Debug, Clone, Default)]
pub struct PasswordGenerator {
    policy: PasswordPolicy,
}

impl PasswordGenerator {
    pub fn new(policy: PasswordPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// 使用系统CSPRNG生成指定长度的密码
    pub fn generate(&self, length: usize) -> Result<GeneratedPassword> {
        self.generate_with_rng(length, &mut OsRng)
    }

    /// 使用调用方提供的CSPRNG生成密码
    pub fn generate_with_rng<R>(&self, length: usize, rng: &mut R) -> Result<GeneratedPassword>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        self.policy.validate()?;
        self.policy.check_length(length)?;

        let alphabet = self.policy.alphabet();
        let mut chars: Vec<char> = Vec::with_capacity(length);

        for class in &self.policy.required_classes {
            chars.push(class.pick(rng));
        }

        while chars.len() < length {
            chars.push(alphabet[rng.gen_range(0..alphabet.len())]);
        }

        chars.shuffle(rng);

        let password: String = chars.into_iter().collect();
        log::debug!(
            "已生成密码: 长度 {}, 覆盖字符类 {}",
            password.len(),
            self.covered_classes(&password).join("/")
        );

        Ok(GeneratedPassword::from(password))
    }

    /// 返回密码中出现的字符类名称
    pub fn covered_classes(&self, password: &str) -> Vec<&'static str> {
        self.policy
            .required_classes
            .iter()
            .filter(|class| password.chars().any(|c| class.contains(c)))
            .map(|class| class.name)
            .collect()
    }
}

/// 以默认策略生成强密码
pub fn generate_strong_password(length: usize) -> Result<GeneratedPassword> {
    PasswordGenerator::default().generate(length)
}
