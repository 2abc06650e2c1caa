//! Static ticker → product page table for ASX-listed funds.

/// Regional suffix stripped from user-entered tickers.
pub const REGIONAL_SUFFIX: &str = ".AX";

/// Exchange prefix used when qualifying a ticker for web search.
pub const EXCHANGE: &str = "ASX";

pub const ETF_URLS: &[(&str, &str)] = &[
    // Vanguard
    ("VAP", "https://www.vanguard.com.au/personal/investments/products/VAP/overview"),
    ("VGS", "https://www.vanguard.com.au/personal/investments/products/VGS/overview"),
    ("VEU", "https://www.vanguard.com.au/personal/investments/products/VEU/overview"),
    ("VTS", "https://www.vanguard.com.au/personal/investments/products/VTS/overview"),
    ("VEQ", "https://www.vanguard.com.au/personal/investments/products/VEQ/overview"),
    // State Street (SPDR)
    (
        "DJRE",
        "https://www.ssga.com/au/en_gb/individual/etfs/funds/spdr-dow-jones-global-real-estate-esg-select-etf-djre",
    ),
    // Magellan
    ("MGOC", "https://www.magellangroup.com.au/funds/magellan-global-fund-open-class-asx-mgoc/"),
    ("OPPT", "https://www.magellangroup.com.au/funds/magellan-global-opportunities-fund-oppt/"),
    ("MICH", "https://www.magellangroup.com.au/funds/magellan-infrastructure-currency-hedged-fund-mich/"),
    // Intelligent Investor
    ("INIF", "https://www.intelligentinvestor.com.au/invest-with-us/income-fund/inif"),
    ("IIGF", "https://www.intelligentinvestor.com.au/invest-with-us/growth-fund/iigf"),
    ("IISV", "https://www.intelligentinvestor.com.au/invest-with-us/select-value-share-fund/iisv"),
    // iShares (BlackRock)
    ("IEM", "https://www.blackrock.com/au/individual/products/251341/ishares-msci-emerging-markets-etf"),
    // BetaShares
    ("A200", "https://www.betashares.com.au/fund/australia-200-etf/"),
    ("F100", "https://www.betashares.com.au/fund/ftse-100-etf/"),
    ("INCM", "https://www.betashares.com.au/fund/global-income-leaders-etf/"),
    ("ASIA", "https://www.betashares.com.au/fund/asia-technology-tigers-etf/"),
    // L1 Capital
    ("LSF", "https://l1capital.com.au/l1-long-short-fund-limited-asx-lsf/"),
    // Wilson Asset Management
    ("WGB", "https://www.wilsonassetmanagement.com.au/listed-investment-companies/wam-global/"),
];

/// "vgs.ax " → "VGS"
pub fn clean_ticker(s: &str) -> String {
    let upper = s.trim().to_uppercase();
    upper
        .strip_suffix(REGIONAL_SUFFIX)
        .unwrap_or(&upper)
        .trim()
        .to_string()
}

/// Product page for a ticker, accepting any casing and the regional suffix.
pub fn lookup(ticker: &str) -> Option<&'static str> {
    let clean = clean_ticker(ticker);
    ETF_URLS
        .iter()
        .find(|(symbol, _)| *symbol == clean)
        .map(|(_, url)| *url)
}

/// "VGS" → "ASX:VGS"
pub fn exchange_qualified(ticker: &str) -> String {
    format!("{}:{}", EXCHANGE, clean_ticker(ticker))
}
