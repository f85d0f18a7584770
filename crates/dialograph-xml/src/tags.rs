//! Element and attribute names of the scenario document format.

pub const EL_SCENARIO: &str = "Сценарий";
pub const EL_VECTORS: &str = "Управляющие_воздействия";
pub const EL_VECTOR: &str = "Вектор";
pub const EL_SYNONYM: &str = "Синоним";
pub const EL_STATES: &str = "Состояния";
pub const EL_STATE: &str = "Состояние";
pub const EL_DESCRIPTION: &str = "Описание";
pub const EL_CONTENT: &str = "Содержание";
pub const EL_ENTRIES: &str = "Входы";
pub const EL_ENTRY: &str = "Вход";
pub const EL_TRANSITIONS: &str = "Переходы";
pub const EL_TRANSITION: &str = "Переход";
pub const EL_STEP: &str = "Шаг";

pub const ATTR_ID: &str = "ид";
pub const ATTR_NAME: &str = "название";
pub const ATTR_DESCRIPTION: &str = "описание";
pub const ATTR_TYPE: &str = "тип";
pub const ATTR_REQUIRED: &str = "обязательное";
pub const ATTR_STATE: &str = "состояние";
pub const ATTR_VECTOR: &str = "вектор";
pub const ATTR_FROM: &str = "из";
pub const ATTR_TO: &str = "в";

pub const YES: &str = "да";
pub const NO: &str = "нет";

pub const TYPE_LEVENSHTEIN: &str = "levenshtein";
