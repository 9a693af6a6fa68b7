/// Element ids shared by every visualizer page.
pub const CANVAS_ID: &str = "vizCanvas";
pub const MESSAGE_ID: &str = "msgContent";
pub const CAPTION_ID: &str = "captionText";
pub const STATUS_ID: &str = "statusText";
pub const SPEED_ID: &str = "speedRange";
pub const SPEED_LABEL_ID: &str = "speedDisplay";
pub const PREV_ID: &str = "prevBtn";
pub const NEXT_ID: &str = "nextBtn";
pub const PLAY_ID: &str = "playBtn";
pub const RESET_ID: &str = "resetBtn";
pub const START_ID: &str = "startBtn";

/// Containers a scene may write DOM tables into; cleared on reset.
pub const TABLE_SLOTS: [&str; 6] = ["dpTable", "lTable", "table-e", "table-w", "table-root", "stackList"];

// Knapsack
pub const CAPACITY_ID: &str = "capacity";
pub const ITEM_WEIGHT_ID: &str = "itemWeight";
pub const ITEM_VALUE_ID: &str = "itemValue";
pub const ADD_ITEM_ID: &str = "addItemBtn";
pub const CLEAR_ITEMS_ID: &str = "clearItemsBtn";
pub const ITEM_LIST_ID: &str = "itemList";

// LCS, LPS, MED
pub const TEXT1_ID: &str = "text1";
pub const TEXT2_ID: &str = "text2";
pub const LPS_TEXT_ID: &str = "lpsText";
pub const MED_S1_ID: &str = "s1";
pub const MED_S2_ID: &str = "s2";

// Matrix chain
pub const MAT_ROWS_ID: &str = "matRows";
pub const MAT_COLS_ID: &str = "matCols";
pub const ADD_MATRIX_ID: &str = "addMatrixBtn";
pub const CLEAR_MATRICES_ID: &str = "clearMatricesBtn";
pub const MATRIX_LIST_ID: &str = "matrixList";

// Rod cutting
pub const ROD_LENGTH_ID: &str = "rodLength";
pub const PIECE_LENGTH_ID: &str = "pieceLength";
pub const PIECE_PRICE_ID: &str = "piecePrice";
pub const ADD_PRICE_ID: &str = "addPriceBtn";
pub const CLEAR_PRICES_ID: &str = "clearPricesBtn";
pub const PRICE_LIST_ID: &str = "priceList";

// Hungarian
pub const COST_MATRIX_ID: &str = "matrixInput";
pub const PROBLEM_TYPE_ID: &str = "problemType";

// OBST
pub const KEY_P_ID: &str = "pInput";
pub const KEY_Q_ID: &str = "qInput";
pub const Q0_ID: &str = "q0Input";
pub const Q_MODE_ID: &str = "qMode";
pub const ADD_KEY_ID: &str = "addKeyBtn";
pub const CLEAR_KEYS_ID: &str = "clearKeysBtn";
pub const KEY_LIST_ID: &str = "keyList";

// Trees
pub const TREE_KEY_ID: &str = "keyInput";
pub const INSERT_ID: &str = "insertBtn";
pub const DELETE_ID: &str = "deleteBtn";

// Steiner editor
pub const MODE_RADIO_SELECTOR: &str = "input[name=mode]";
pub const EXAMPLE_GRAPH_ID: &str = "exampleBtn";
pub const CLEAR_GRAPH_ID: &str = "clearGraphBtn";

// Printing neatly
pub const NEAT_TEXT_ID: &str = "inputText";
pub const NEAT_WIDTH_ID: &str = "inputM";

// Hill climbing
pub const GEN_GRAPH_ID: &str = "btn-gen-graph";
pub const RANDOM_PUZZLE_ID: &str = "btn-random-puzzle";
pub const START_GRID_ID: &str = "start-grid";
pub const GOAL_GRID_ID: &str = "goal-grid";

/// Attribute carrying the row index on list remove buttons.
pub const INDEX_ATTR: &str = "data-index";
