//! エラー型の定義
//!
//! このモジュールは、usegライブラリで使用されるすべてのエラー型を定義します。

use std::error::Error;
use std::fmt;

/// useg専用のResult型
///
/// エラー型としてデフォルトで[`UsegError`]を使用します。
pub type Result<T, E = UsegError> = std::result::Result<T, E>;

/// usegのエラー型
///
/// このライブラリで発生する可能性のあるすべてのエラーを表現します。
/// 各バリアントは特定のエラー条件に対応しています。
#[derive(Debug, thiserror::Error)]
pub enum UsegError {
    /// 範囲外エラー
    ///
    /// [`BoundsError`]のエラーバリアント。
    #[error(transparent)]
    Bounds(BoundsError),

    /// モルフ不一致エラー
    ///
    /// [`MismatchError`]のエラーバリアント。
    #[error(transparent)]
    Mismatch(MismatchError),

    /// スキーマエラー
    ///
    /// [`SchemaError`]のエラーバリアント。
    #[error(transparent)]
    Schema(SchemaError),

    /// 事前条件エラー
    ///
    /// [`PreconditionError`]のエラーバリアント。
    #[error(transparent)]
    Precondition(PreconditionError),

    /// 標準I/Oエラー
    ///
    /// [`std::io::Error`]のエラーバリアント。
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl UsegError {
    /// 範囲外エラーを生成します
    ///
    /// # 引数
    ///
    /// * `position` - 範囲外となった文字位置
    /// * `lexeme` - 対象の語彙素の表示文字列
    pub(crate) fn bounds<S>(position: usize, lexeme: S) -> Self
    where
        S: Into<String>,
    {
        Self::Bounds(BoundsError {
            position,
            lexeme: lexeme.into(),
        })
    }

    /// モルフ不一致エラーを生成します
    ///
    /// # 引数
    ///
    /// * `morph` - 一致しなかったモルフ
    /// * `form` - 対象の語形
    /// * `position` - 不一致が起きた文字位置
    pub(crate) fn mismatch<S, T>(morph: S, form: T, position: usize) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        Self::Mismatch(MismatchError {
            morph: morph.into(),
            form: form.into(),
            position,
        })
    }

    /// スキーマエラーを生成します
    ///
    /// # 引数
    ///
    /// * `msg` - エラーメッセージ
    pub(crate) fn schema<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::Schema(SchemaError { msg: msg.into() })
    }

    /// 事前条件エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn precondition<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::Precondition(PreconditionError {
            arg,
            msg: msg.into(),
        })
    }
}

/// モルフィームのスパンが語形の範囲外を指している場合に使用されるエラー
#[derive(Debug)]
pub struct BoundsError {
    /// 範囲外となった文字位置
    pub(crate) position: usize,

    /// 対象の語彙素の表示文字列
    pub(crate) lexeme: String,
}

impl fmt::Display for BoundsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "BoundsError: span position {} is out of bounds in lexeme {}",
            self.position, self.lexeme
        )
    }
}

impl Error for BoundsError {}

/// モルフ列が語形を正確にタイルできない場合に使用されるエラー
#[derive(Debug)]
pub struct MismatchError {
    /// 一致しなかったモルフ
    pub(crate) morph: String,

    /// 対象の語形
    pub(crate) form: String,

    /// 不一致が起きた文字位置
    pub(crate) position: usize,
}

impl fmt::Display for MismatchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "MismatchError: morph '{}' not found in form '{}' at position {} \
             (possibly because an earlier morph blocked it)",
            self.morph, self.form, self.position
        )
    }
}

impl Error for MismatchError {}

/// 直列化フォーマットの制約に違反した場合に使用されるエラー
///
/// 保存時の予約キー衝突、および読み込み時の構造的に不正な行
/// （フィールド数の誤り、不正なJSON、範囲外のスパンなど）を表現します。
#[derive(Debug)]
pub struct SchemaError {
    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SchemaError: {}", self.msg)
    }
}

impl Error for SchemaError {}

/// 引数が事前条件を満たさない場合に使用されるエラー
#[derive(Debug)]
pub struct PreconditionError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PreconditionError: {}: {}", self.arg, self.msg)
    }
}

impl Error for PreconditionError {}
