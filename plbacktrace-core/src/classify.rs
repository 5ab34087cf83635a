//! gdb出力行の分類

use crate::Result;
use regex::Regex;

/// 分類済みのgdb出力行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// ネイティブスタックフレーム行（"bt"の出力）
    Frame {
        /// フレーム番号
        index: u32,
        /// そのフレームのC関数名
        function: String,
    },
    /// printコマンドの結果行（"$NN = VALUE"）
    Value(String),
    /// 認識できない行（バナー、プロンプト、ソースリストなど）
    Other,
}

/// gdb出力行の分類器
///
/// 3つのパターンを固定の優先順で試し、最初にマッチしたものを採用する。
/// どれにもマッチしない行は[`LineClass::Other`]となり、呼び出し側で
/// 黙って捨てられる。gdbのバナーやソースリストが状態機械を乱さない
/// ためには、この取りこぼしが仕様である。
pub struct LineClassifier {
    /// アドレス付きフレーム行 "#NN 0xADDR in FUNC (..."
    frame_with_addr: Regex,
    /// アドレスなしフレーム行 "#NN FUNC (..."
    frame_plain: Regex,
    /// print結果行 "$NN = VALUE"
    print_value: Regex,
}

impl LineClassifier {
    /// 分類器を作成する（正規表現をコンパイルする）
    pub fn new() -> Result<Self> {
        Ok(Self {
            frame_with_addr: Regex::new(r"^#([0-9]+) +0x[0-9a-f]+ in ([^ ]+) ")?,
            frame_plain: Regex::new(r"^#([0-9]+) +([^ ]+) ")?,
            print_value: Regex::new(r"^\$[0-9]+ = (.*)")?,
        })
    }

    /// 1行を分類する
    pub fn classify(&self, line: &str) -> LineClass {
        let line = strip_prompts(line);

        let frame = self
            .frame_with_addr
            .captures(line)
            .or_else(|| self.frame_plain.captures(line));
        if let Some(caps) = frame {
            // 1番目のキャプチャは数字のみにマッチしている
            let index = caps[1].parse().unwrap_or(0);
            return LineClass::Frame {
                index,
                function: caps[2].to_string(),
            };
        }

        if let Some(caps) = self.print_value.captures(line) {
            return LineClass::Value(caps[1].to_string());
        }

        LineClass::Other
    }
}

/// 先頭の"(gdb)"プロンプトをすべて取り除き、前後の空白を落とす
///
/// 対話セッションではプロンプトが同一行に複数回連なることがある。
fn strip_prompts(line: &str) -> &str {
    let mut rest = line.trim();
    while let Some(stripped) = rest.strip_prefix("(gdb)") {
        rest = stripped.trim_start();
    }
    rest
}
