/// Page language for the fixed control strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lang {
    #[default]
    Zh,
    En,
}

impl Lang {
    /// Anything starting with `zh` is Chinese, everything else English.
    pub fn parse(s: &str) -> Lang {
        if s.trim().to_lowercase().starts_with("zh") {
            Lang::Zh
        } else {
            Lang::En
        }
    }

    pub fn status(self, index: usize, total: usize) -> String {
        match self {
            Lang::Zh => format!("步驟 {} / {}", index + 1, total),
            Lang::En => format!("Step {} / {}", index + 1, total),
        }
    }

    pub fn finished(self, total: usize) -> String {
        match self {
            Lang::Zh => format!("步驟 {total} / {total}（執行完成）"),
            Lang::En => format!("Step {total} / {total} (finished)"),
        }
    }

    pub fn ready(self) -> &'static str {
        match self {
            Lang::Zh => "準備就緒",
            Lang::En => "Ready",
        }
    }

    pub fn play_label(self) -> &'static str {
        match self {
            Lang::Zh => "⏵ 自動播放",
            Lang::En => "⏵ Play",
        }
    }

    pub fn pause_label(self) -> &'static str {
        match self {
            Lang::Zh => "⏸ 暫停",
            Lang::En => "⏸ Pause",
        }
    }

    pub fn initial_message(self) -> &'static str {
        match self {
            Lang::Zh => "請設定參數並點擊執行。",
            Lang::En => "Set the parameters and press Run.",
        }
    }

    pub fn preview_message(self) -> &'static str {
        match self {
            Lang::Zh => "預覽模式：請輸入資料並點擊執行以開始計算。",
            Lang::En => "Preview: enter the input and press Run to start.",
        }
    }

    pub fn stale_message(self) -> &'static str {
        match self {
            Lang::Zh => "設定已變更，請重新執行。",
            Lang::En => "Input changed, run again.",
        }
    }

    pub fn cleared_message(self) -> &'static str {
        match self {
            Lang::Zh => "已清除。",
            Lang::En => "Cleared.",
        }
    }

    pub fn weight_prompt(self) -> &'static str {
        match self {
            Lang::Zh => "請輸入邊的權重（正整數）：",
            Lang::En => "Edge weight (positive integer):",
        }
    }

    pub fn fetch_failed(self) -> &'static str {
        match self {
            Lang::Zh => "發生錯誤，請檢查輸入或稍後再試。",
            Lang::En => "Something went wrong. Check the input or try again later.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_one_based() {
        assert_eq!(Lang::Zh.status(0, 12), "步驟 1 / 12");
        assert_eq!(Lang::En.status(11, 12), "Step 12 / 12");
    }

    #[test]
    fn parse_falls_back_to_english() {
        assert_eq!(Lang::parse("zh-TW"), Lang::Zh);
        assert_eq!(Lang::parse("fr"), Lang::En);
    }
}
