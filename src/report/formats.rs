// ==========================================
// 检查表报告系统 - 单元格样式
// ==========================================
// 说明: 样式仅影响外观，单元格取值与行序由生成器决定
// ==========================================

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder};

/// 报告通用样式集
pub struct ReportFormats {
    pub header: Format,       // 表头：粗体、居中、细边框、换行
    pub bold: Format,         // 章节/子章节标题行
    pub text: Format,         // 普通正文（换行）
    pub cell: Format,         // 表格正文（细边框、换行）
    pub centered: Format,     // 表格序号/标记列
    pub score: Format,        // 得分（两位小数）
    pub title: Format,        // 大标题
    pub subtitle: Format,     // 表格标题
    pub label: Format,        // 表头信息行
    pub note: Format,         // 斜体说明
    pub placeholder: Format,  // 灰色斜体占位文本
    pub error_note: Format,   // 红色斜体错误文本
    pub zebra_cell: Format,   // 偶数行底色
    pub zebra_center: Format, // 偶数行底色（居中）
}

impl ReportFormats {
    pub fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap()
                .set_border(FormatBorder::Thin),
            bold: Format::new().set_bold(),
            text: Format::new().set_text_wrap(),
            cell: Format::new()
                .set_align(FormatAlign::Left)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap()
                .set_border(FormatBorder::Thin),
            centered: Format::new()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin),
            score: Format::new().set_bold().set_num_format("0.00"),
            title: Format::new()
                .set_bold()
                .set_font_size(16)
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
            subtitle: Format::new()
                .set_bold()
                .set_font_size(14)
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
            label: Format::new().set_bold().set_font_size(12),
            note: Format::new().set_italic(),
            placeholder: Format::new()
                .set_italic()
                .set_font_color(0x808080)
                .set_border(FormatBorder::Thin),
            error_note: Format::new()
                .set_italic()
                .set_font_color(0xFF0000)
                .set_border(FormatBorder::Thin),
            zebra_cell: Format::new()
                .set_align(FormatAlign::Left)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap()
                .set_border(FormatBorder::Thin)
                .set_background_color(0xFFE6E6),
            zebra_center: Format::new()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_background_color(0xFFE6E6),
        }
    }

    /// 违规表头（灰色底）
    pub fn shaded_header(&self) -> Format {
        self.header.clone().set_background_color(0xD3D3D3)
    }
}

impl Default for ReportFormats {
    fn default() -> Self {
        Self::new()
    }
}

/// 报告展示用两位小数取整
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
