//! usegの共通設定
//!
//! このモジュールは、ライブラリ全体で共有される定数を提供します。

/// 整列エンジンが受け付ける語形・モルフ連結の最大文字数
///
/// 整列の動的計画法は入力長の積に比例した時間と空間を消費するため、
/// この上限を超える入力は事前条件エラーとして拒否されます。
/// 単語規模の入力（数十文字）に対しては十分すぎる余裕があります。
pub const MAX_WORD_LEN: usize = 1024;
