//! 可视化类别与分类器
//!
//! 分类器按固定顺序对整段源码做子串检测，后命中的规则覆盖先命中的（last-match-wins）。
//! 整段源码只分类一次，所有步骤共用同一类别。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 九种可视化类别（决定步骤合成公式与展示方式）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Variables,
    Loops,
    Functions,
    Arrays,
    Dictionaries,
    ControlFlow,
    FileHandling,
    ErrorHandling,
    Modules,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Variables,
        Category::Loops,
        Category::Functions,
        Category::Arrays,
        Category::Dictionaries,
        Category::ControlFlow,
        Category::FileHandling,
        Category::ErrorHandling,
        Category::Modules,
    ];

    /// snake_case 标签（与序列化结果一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Variables => "variables",
            Category::Loops => "loops",
            Category::Functions => "functions",
            Category::Arrays => "arrays",
            Category::Dictionaries => "dictionaries",
            Category::ControlFlow => "control_flow",
            Category::FileHandling => "file_handling",
            Category::ErrorHandling => "error_handling",
            Category::Modules => "modules",
        }
    }

    /// 角标文字，如 `CONTROL FLOW`
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ").to_uppercase()
    }

    /// 画布标题（装饰性常量）
    pub fn title(&self) -> &'static str {
        match self {
            Category::Variables => "Variables & Data Types - Memory Cell Diagram",
            Category::Loops => "Loops - Step-by-Step Animator",
            Category::Functions => "Functions & Scope - Call Stack Visualizer",
            Category::Arrays => "Arrays & Lists - Interactive Memory Layout",
            Category::Dictionaries => "Dictionaries - Key-Value Grid",
            Category::ControlFlow => "Control Flow - Code Trace Simulator",
            Category::FileHandling => "File Handling - Stream Visualizer",
            Category::ErrorHandling => "Error Handling - Debug Trail Replay",
            Category::Modules => "Modules & Packages - Import Flow Tree",
        }
    }

    /// 展示所用技术栈（装饰性常量）
    pub fn tools(&self) -> &'static [&'static str] {
        match self {
            Category::Variables => &["p5.js", "Canvas API", "Memory Animation"],
            Category::Loops => &["p5.js", "Canvas API", "Framer Motion"],
            Category::Functions => &["D3.js", "SVG", "Dagre.js Layout"],
            Category::Arrays => &["p5.js", "Canvas API", "Interactive Animation"],
            Category::Dictionaries => &["p5.js", "Canvas API", "Hash Visualization"],
            Category::ControlFlow => &["D3.js", "SVG", "Path Animation"],
            Category::FileHandling => &["D3.js", "SVG", "Stream Animation"],
            Category::ErrorHandling => &["D3.js", "SVG", "Timeline UI"],
            Category::Modules => &["D3.js", "SVG", "Tree Layout"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 类别检测器：纯函数，无副作用
pub struct CategoryClassifier;

impl CategoryClassifier {
    /// 按规则顺序检测，最后命中的规则生效；无任何命中时为 Variables
    pub fn classify(source: &str) -> Category {
        let mut category = Category::Variables;

        if Self::has_any(source, &["for ", "while "]) {
            category = Category::Loops;
        }
        if Self::has_any(source, &["def ", "function"]) {
            category = Category::Functions;
        }
        if source.contains('[') && source.contains(']') {
            category = Category::Arrays;
        }
        if source.contains('{') && source.contains(':') {
            category = Category::Dictionaries;
        }
        if Self::has_any(source, &["if ", "else"]) {
            category = Category::ControlFlow;
        }
        if Self::has_any(source, &["open(", "file"]) {
            category = Category::FileHandling;
        }
        if Self::has_any(source, &["try:", "except"]) {
            category = Category::ErrorHandling;
        }
        if Self::has_any(source, &["import ", "from "]) {
            category = Category::Modules;
        }

        category
    }

    fn has_any(source: &str, cues: &[&str]) -> bool {
        cues.iter().any(|cue| source.contains(cue))
    }
}

/// 便捷入口，等价于 [`CategoryClassifier::classify`]
pub fn classify(source: &str) -> Category {
    CategoryClassifier::classify(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_variables() {
        assert_eq!(classify("x = 5\ny = 'hello'"), Category::Variables);
        assert_eq!(classify(""), Category::Variables);
        assert_eq!(classify("   \n\t\n"), Category::Variables);
    }

    #[test]
    fn test_single_rules() {
        assert_eq!(classify("while x < 3:\n    x += 1"), Category::Loops);
        assert_eq!(classify("def add(a, b):\n    return a + b"), Category::Functions);
        assert_eq!(classify("nums = [1, 2, 3]"), Category::Arrays);
        assert_eq!(classify("d = {'a': 1}"), Category::Dictionaries);
        assert_eq!(classify("if x > 1:\n    y = 2"), Category::ControlFlow);
        assert_eq!(classify("f = open('a.txt')"), Category::FileHandling);
        assert_eq!(classify("try:\n    x = 1"), Category::ErrorHandling);
        assert_eq!(classify("import os"), Category::Modules);
    }

    #[test]
    fn test_later_rule_wins() {
        assert_eq!(
            classify("import os\nfor x in range(3): pass"),
            Category::Modules
        );
        // range(3): 含冒号但没有花括号，arrays 未命中，loops 生效
        assert_eq!(classify("for i in range(3):\n    print(i)"), Category::Loops);
        // functions 之后命中 control_flow
        assert_eq!(
            classify("def f(n):\n    if n <= 1:\n        return n"),
            Category::ControlFlow
        );
    }

    #[test]
    fn test_array_needs_both_brackets() {
        assert_eq!(classify("x = a[0"), Category::Variables);
        assert_eq!(classify("x = 0]"), Category::Variables);
    }

    #[test]
    fn test_classify_is_pure() {
        let src = "for i in range(10):\n    total = total + i";
        assert_eq!(classify(src), classify(src));
    }

    #[test]
    fn test_label_and_serde_tag() {
        assert_eq!(Category::ControlFlow.label(), "CONTROL FLOW");
        assert_eq!(Category::Modules.to_string(), "modules");
        assert_eq!(
            serde_json::to_string(&Category::ErrorHandling).unwrap(),
            "\"error_handling\""
        );
        for category in Category::ALL {
            assert_eq!(category.tools().len(), 3);
        }
    }
}
