//! plbacktrace のgdbセッション制御
//!
//! このクレートは、gdbサブプロセスの起動・コマンド送信・終了処理と、
//! その2つの出力ストリームをデッドロックなしに読み取るための
//! 出力リレーを提供します。gdb出力の解釈は行いません。

pub mod errors;
pub mod relay;
pub mod session;

pub use errors::SessionError;
pub use relay::{spawn_readers, RelayMessage};
pub use session::GdbSession;
