//! The tool catalog advertised in `tools/list`
//!
//! Contracts are advisory: clients use them for hinting, while the whitelist
//! in `super::whitelist` is what actually limits forwarded parameters.

use super::definition::{SchemaNode, ToolDefinition, ToolName};
use super::request::{DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT};

/// 元号 values accepted by `law_num_era`
pub const LAW_NUM_ERAS: [&str; 5] = ["Meiji", "Taisho", "Showa", "Heisei", "Reiwa"];

/// 法令種別 values accepted by `law_num_type`
pub const LAW_NUM_TYPES: [&str; 6] = [
    "Constitution",
    "Act",
    "CabinetOrder",
    "ImperialOrder",
    "MinisterialOrdinance",
    "Rule",
];

const QUERY_PARAMETERS: &str = "queryParameters";

/// Immutable, ordered set of tool definitions
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: Vec<ToolDefinition>,
}

impl ToolCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// The five e-Gov law tools
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for definition in [list_laws(), search_laws(), get_law(), get_law_revisions(), get_law_file()] {
            catalog.register(definition);
        }
        catalog
    }

    /// Add a definition, replacing any with the same name
    pub fn register(&mut self, definition: ToolDefinition) {
        self.tools.retain(|t| t.name != definition.name);
        self.tools.push(definition);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// All definitions, in catalog order
    pub fn list(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// List all tool names
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn law_id() -> SchemaNode {
    SchemaNode::string().with_description("法令ID。例： 322CO0000000016")
}

fn law_num(partial: bool) -> SchemaNode {
    let description = if partial {
        "法令番号（部分一致）。例： 昭和二十二年政令第十六号"
    } else {
        "法令番号。例： 昭和二十二年政令第十六号"
    };
    SchemaNode::string().with_description(description)
}

fn law_revision_id() -> SchemaNode {
    SchemaNode::string().with_description("法令履歴ID。例： 322CO0000000016_20150801_427CO0000000217")
}

fn law_num_era() -> SchemaNode {
    SchemaNode::string()
        .with_enum(LAW_NUM_ERAS)
        .with_description("法令番号の元号（Meiji: 明治, Taisho: 大正, Showa: 昭和, Heisei: 平成, Reiwa: 令和）")
}

fn law_num_type() -> SchemaNode {
    SchemaNode::string().with_enum(LAW_NUM_TYPES).with_description(
        "法令番号の法令種別（Constitution: 憲法, Act: 法律, CabinetOrder: 政令, ImperialOrder: 勅令, MinisterialOrdinance: 府省令, Rule: 規則）",
    )
}

fn law_title() -> SchemaNode {
    SchemaNode::string().with_description("法令名又は法令略称（部分一致）")
}

fn law_title_kana() -> SchemaNode {
    SchemaNode::string().with_description("法令名読み（部分一致）")
}

fn asof() -> SchemaNode {
    SchemaNode::date("法令の時点。例： 2023-07-01")
}

fn order() -> SchemaNode {
    SchemaNode::string().with_description(
        "並び順。返却値の項目を指定。先頭に+を付した場合は昇順、-の符号を付した場合は降順。符号がない場合は昇順。",
    )
}

fn promulgation_range(query: SchemaNode) -> SchemaNode {
    query
        .with_property(
            "promulgation_date_from",
            SchemaNode::date("公布日（指定値を含む、それ以後）。例： 2023-07-01"),
        )
        .with_property(
            "promulgation_date_to",
            SchemaNode::date("公布日（指定値を含む、それ以前）。例： 2023-07-01"),
        )
}

fn amendment_filters(query: SchemaNode) -> SchemaNode {
    query
        .with_property(
            "amendment_date_from",
            SchemaNode::date("改正法令施行期日（指定値を含む、それ以後）。例： 2024-06-07"),
        )
        .with_property(
            "amendment_date_to",
            SchemaNode::date("改正法令施行期日（指定値を含む、それ以前）。例： 2024-06-07"),
        )
        .with_property(
            "amendment_law_id",
            SchemaNode::string().with_description("改正法令の法令ID（部分一致）。例： 506AC0000000046"),
        )
        .with_property(
            "amendment_law_num",
            SchemaNode::string().with_description("改正法令の法令番号（部分一致）。例： 令和六年法律第四十六号"),
        )
        .with_property(
            "amendment_law_title",
            SchemaNode::string().with_description("改正法令の法令名（部分一致）"),
        )
}

fn list_laws() -> ToolDefinition {
    let query = SchemaNode::object()
        .with_property("law_id", law_id())
        .with_property("law_num", law_num(true))
        .with_property("law_num_era", law_num_era())
        .with_property("law_num_type", law_num_type())
        .with_property("law_title", law_title())
        .with_property("law_title_kana", law_title_kana());
    let query = amendment_filters(query).with_property("asof", asof());
    let query = promulgation_range(query).with_property("order", order()).deny_unknown_keys();

    ToolDefinition::new(ToolName::ListLaws, "指定条件に該当する法令データの一覧を取得します。").with_contract(
        SchemaNode::object()
            .with_property("limit", SchemaNode::integer().with_default(DEFAULT_LIST_LIMIT))
            .with_property(QUERY_PARAMETERS, query),
    )
}

fn search_laws() -> ToolDefinition {
    let query = SchemaNode::object()
        .with_property("law_num", law_num(true))
        .with_property("law_num_era", law_num_era())
        .with_property("law_num_type", law_num_type())
        .with_property("law_title", law_title())
        .with_property("law_title_kana", law_title_kana())
        .with_property("asof", asof());
    let query = promulgation_range(query).with_property("order", order()).deny_unknown_keys();

    ToolDefinition::new(
        ToolName::SearchLaws,
        "キーワードで法令を検索します。keyword: 検索文字列（例：建築基準法）",
    )
    .with_contract(
        SchemaNode::object()
            .with_property("keyword", SchemaNode::string().with_description("検索文字列。例： 建築基準法"))
            .with_property("limit", SchemaNode::integer().with_default(DEFAULT_SEARCH_LIMIT))
            .with_property(QUERY_PARAMETERS, query)
            .with_required("keyword"),
    )
}

fn identifier_contract() -> SchemaNode {
    SchemaNode::object()
        .with_property("law_id", law_id())
        .with_property("law_num", law_num(false))
        .with_property("law_revision_id", law_revision_id())
}

fn get_law() -> ToolDefinition {
    ToolDefinition::new(
        ToolName::GetLaw,
        "法令本文を取得します。law_id, law_num, law_revision_id のいずれかを指定してください。",
    )
    .with_contract(identifier_contract())
}

fn get_law_revisions() -> ToolDefinition {
    let query = SchemaNode::object()
        .with_property("law_title", law_title())
        .with_property("law_title_kana", law_title_kana());
    let query = amendment_filters(query)
        .with_property(
            "amendment_promulgate_date_from",
            SchemaNode::date("改正法令公布日（指定値を含む、それ以後）。例： 2023-07-01"),
        )
        .with_property(
            "amendment_promulgate_date_to",
            SchemaNode::date("改正法令公布日（指定値を含む、それ以前）。例： 2023-07-01"),
        )
        .with_property(
            "remain_in_force",
            SchemaNode::boolean().with_description(
                "廃止後の効力（true:廃止後でも効力を有するもの / false:廃止後に効力を有しないもの）。例： false",
            ),
        )
        .with_property(
            "repeal_date_from",
            SchemaNode::date("廃止日（指定値を含む、それ以後）。例： 2024-04-01"),
        )
        .with_property(
            "repeal_date_to",
            SchemaNode::date("廃止日（指定値を含む、それ以前）。例： 2024-04-01"),
        )
        .deny_unknown_keys();

    ToolDefinition::new(
        ToolName::GetLawRevisions,
        "法令の履歴一覧を取得します。law_id を指定してください。",
    )
    .with_contract(
        SchemaNode::object()
            .with_property("law_id", law_id())
            .with_property(QUERY_PARAMETERS, query),
    )
}

fn get_law_file() -> ToolDefinition {
    ToolDefinition::new(
        ToolName::GetLawFile,
        "法令本文ファイルを取得します（Base64）。law_id, law_num, law_revision_id のいずれかを指定してください。",
    )
    .with_contract(identifier_contract())
}
