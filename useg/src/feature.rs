//! 開放的な素性注釈の表現
//!
//! このモジュールは、語彙素とモルフィームに付与される素性注釈の型を
//! 提供します。素性はキーが文字列の開いたマップで、値は文字列・整数・
//! 真偽値・リスト・マップの閉じた直和型です。これにより、任意のJSON
//! オブジェクトを型のない「any」を使わずに損失なく往復できます。
//! 浮動小数点数とnullは表現できず、読み込み時に構造エラーとして
//! 拒否されます。
//!
//! キーは[`BTreeMap`]により常に整列されているため、直列化出力は
//! 正準（キー昇順）になります。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 素性マップ
///
/// キー昇順で反復される、文字列キーの開いたマップです。
pub type FeatureMap = BTreeMap<String, FeatureValue>;

/// 素性の値
///
/// JSONのサブセットに対応する閉じた直和型です。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    /// 文字列値
    String(String),
    /// 整数値
    Integer(i64),
    /// 真偽値
    Boolean(bool),
    /// 値のリスト
    List(Vec<FeatureValue>),
    /// 入れ子のマップ
    Map(FeatureMap),
}

impl FeatureValue {
    /// 文字列値であればその参照を返します
    #[inline(always)]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// 整数値であればその値を返します
    #[inline(always)]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// 真偽値であればその値を返します
    #[inline(always)]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// リストであればそのスライスを返します
    #[inline(always)]
    pub fn as_list(&self) -> Option<&[FeatureValue]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// マップであればその参照を返します
    #[inline(always)]
    pub fn as_map(&self) -> Option<&FeatureMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for FeatureValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FeatureValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Vec<FeatureValue>> for FeatureValue {
    fn from(value: Vec<FeatureValue>) -> Self {
        Self::List(value)
    }
}

impl From<FeatureMap> for FeatureValue {
    fn from(value: FeatureMap) -> Self {
        Self::Map(value)
    }
}
